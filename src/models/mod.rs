pub mod config;
pub mod display_spec;
pub mod image;

pub use config::{AppConfig, DecodeConfig};
pub use display_spec::DisplaySpec;
pub use image::{rgb888_len, RgbImage};
