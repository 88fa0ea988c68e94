//! Image preprocessing applied before dithering.
//!
//! Currently this is resolution fitting: [`resize_bilinear`] scales an
//! RGB888 buffer to the panel resolution using integer-only arithmetic.

mod resize;

pub use resize::{resize_bilinear, scale_rgb888, FIXED_ONE, FIXED_SHIFT};
