//! Palette types and nearest-color matching
//!
//! The palette is fixed: six colors matching what a six-color e-paper
//! panel can show. Matching uses squared Euclidean distance in RGB.

mod palette;

pub use palette::{nearest_color, Palette, PaletteColor, PALETTE, PALETTE_SIZE};
