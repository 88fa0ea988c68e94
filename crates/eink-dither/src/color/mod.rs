//! Color types
//!
//! Everything in this crate works on packed 8-bit RGB (`RGB888`): three
//! bytes per pixel in R, G, B order, rows stored top to bottom.
//!
//! # Example
//!
//! ```
//! use eink_dither::Rgb888;
//!
//! let orange = Rgb888::new(255, 128, 0);
//! assert_eq!(orange.to_bytes(), [255, 128, 0]);
//! assert_eq!(orange.to_string(), "#FF8000");
//! ```

mod rgb888;

pub use rgb888::{Rgb888, BYTES_PER_PIXEL};
