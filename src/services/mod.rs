pub mod image_decoder;
pub mod pipeline;

pub use image_decoder::{ImageDecoder, ImageFormat};
pub use pipeline::{ConversionPipeline, ConversionReport};
