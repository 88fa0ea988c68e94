//! Error type for the eink-dither public API.

use std::fmt;

/// Errors returned by the resampler and the dithering engine.
///
/// Neither variant carries sizes; callers that want them in their logs
/// already hold the dimensions they passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherError {
    /// A width or height was zero, or a buffer length did not match
    /// `width * height * 3`.
    InvalidDimensions,
    /// The working buffer could not be allocated.
    Allocation,
}

impl fmt::Display for DitherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DitherError::InvalidDimensions => {
                write!(f, "invalid image dimensions or buffer length")
            }
            DitherError::Allocation => write!(f, "failed to allocate working buffer"),
        }
    }
}

impl std::error::Error for DitherError {}

/// Byte length of an RGB888 buffer, or `InvalidDimensions` if either side is
/// zero or the product overflows.
pub(crate) fn rgb888_len(width: usize, height: usize) -> Result<usize, DitherError> {
    if width == 0 || height == 0 {
        return Err(DitherError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(crate::color::BYTES_PER_PIXEL))
        .ok_or(DitherError::InvalidDimensions)
}
