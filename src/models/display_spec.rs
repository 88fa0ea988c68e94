use serde::Deserialize;

use crate::error::ImageError;
use crate::models::image::rgb888_len;

/// Resolution of the target panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplaySpec {
    pub width: u32,
    pub height: u32,
}

impl DisplaySpec {
    /// 7.3" six-color e-paper panel: 800x480.
    pub const SIX_COLOR_7IN3: Self = Self {
        width: 800,
        height: 480,
    };

    /// Build a spec, rejecting zero dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions);
        }
        Ok(Self { width, height })
    }

    /// Size of a full-frame RGB888 buffer for this panel.
    pub fn frame_bytes(&self) -> usize {
        rgb888_len(self.width, self.height).unwrap_or(usize::MAX)
    }

    /// Whether an image of `width x height` already fits the panel exactly.
    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl Default for DisplaySpec {
    fn default() -> Self {
        Self::SIX_COLOR_7IN3
    }
}
