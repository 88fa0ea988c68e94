use eink_dither::DitherError;
use thiserror::Error;

use crate::memory::MemoryRegion;

/// Errors from decoding, transforming and encoding images.
///
/// Variants carry a short static reason at most. Sizes and dimensions are
/// logged where the failure happens instead of being stored here.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Bad signature or magic, truncated or corrupt stream.
    #[error("Format error: {0}")]
    Format(&'static str),

    /// Recognised container, but an encoding variant this crate does not
    /// handle (bit depth, compression, interlacing).
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(&'static str),

    /// A buffer could not be allocated in the given region.
    #[error("Allocation failed in {0} region")]
    Allocation(MemoryRegion),

    /// Zero width/height, or a pixel buffer whose length does not match
    /// its dimensions.
    #[error("Invalid image dimensions")]
    InvalidDimensions,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageError {
    /// Map an `eink-dither` error, attributing allocation failures to the
    /// region the working buffer was meant for.
    pub fn from_dither(err: DitherError, region: MemoryRegion) -> Self {
        match err {
            DitherError::InvalidDimensions => ImageError::InvalidDimensions,
            DitherError::Allocation => ImageError::Allocation(region),
        }
    }

    /// Whether this is an allocation failure.
    pub fn is_allocation(&self) -> bool {
        matches!(self, ImageError::Allocation(_))
    }
}
