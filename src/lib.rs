//! epd-imgdecode
//!
//! Memory-bounded PNG, JPEG and BMP decoding to RGB888, with bilinear
//! resampling and six-color Floyd–Steinberg dithering for e-paper panels.
//! Pixel math lives in the `eink-dither` crate; this crate owns the codecs,
//! the allocation regions every buffer is accounted against, and the
//! conversion pipeline.

pub mod codec;
pub mod error;
pub mod memory;
pub mod models;
pub mod services;

pub use error::ImageError;
pub use models::{AppConfig, DisplaySpec, RgbImage};
pub use services::{ConversionPipeline, ConversionReport, ImageDecoder, ImageFormat};
