#![allow(clippy::module_inception, clippy::needless_range_loop)]

//! eink-dither: palette quantization for six-color e-ink displays
//!
//! This library maps full-color RGB888 images onto the fixed
//! black/white/red/green/blue/yellow palette of six-color e-paper panels,
//! and resamples images to the panel resolution beforehand.
//!
//! # Quick Start
//!
//! ```
//! use eink_dither::{dither_rgb888, scale_rgb888, FloydSteinberg, PALETTE};
//!
//! // A 4x2 grey image, scaled up to 8x4 and then dithered.
//! let src = vec![128u8; 4 * 2 * 3];
//! let scaled = scale_rgb888(&src, 4, 2, 8, 4).unwrap();
//!
//! let mut out = vec![0u8; scaled.len()];
//! dither_rgb888(&FloydSteinberg, &scaled, &mut out, 8, 4, &PALETTE).unwrap();
//! ```
//!
//! # Pixel Layout
//!
//! All buffers are packed RGB888: `width * height * 3` bytes, row-major,
//! top row first, channels in R, G, B order. Functions check buffer
//! lengths against the dimensions they are given and return
//! [`DitherError::InvalidDimensions`] on mismatch without writing output.
//!
//! # Color Matching
//!
//! [`nearest_color`] picks the palette entry with the smallest squared
//! Euclidean distance in RGB. The scan runs in palette order with a strict
//! comparison, so exact ties resolve to the lower index. Dithered output
//! depends on this: changing the tie-break changes the pattern.
//!
//! # Error Diffusion
//!
//! [`FloydSteinberg`] runs a single left-to-right, top-to-bottom pass over
//! a private working copy of the source. The error of each pixel
//! (working value minus chosen palette value, per channel, signed) is
//! pushed into the working copy of its unvisited neighbors with weights
//! 7/16, 3/16, 5/16 and 1/16, clamping every updated channel to `0..=255`
//! immediately. The source buffer is never written.
//!
//! # Resampling
//!
//! [`resize_bilinear`] uses 10-bit fixed point throughout; see
//! [`preprocess`] for details.

pub mod color;
pub mod dither;
pub mod error;
pub mod palette;
pub mod preprocess;


pub use color::{Rgb888, BYTES_PER_PIXEL};
pub use dither::{dither_rgb888, dither_rgb888_with_workspace, Dither, FloydSteinberg, Kernel};
pub use error::DitherError;
pub use palette::{nearest_color, Palette, PaletteColor, PALETTE, PALETTE_SIZE};
pub use preprocess::{resize_bilinear, scale_rgb888};
