use std::sync::Arc;

use eink_dither::{Rgb888, BYTES_PER_PIXEL};

use crate::error::ImageError;
use crate::memory::{HeapBuffer, ImageHeap, MemoryRegion};

/// Byte length of a `width x height` RGB888 buffer, `None` on overflow.
pub fn rgb888_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// An owned RGB888 image: `width * height * 3` bytes, row-major, top row
/// first, channels R, G, B.
///
/// The pixel storage is a [`HeapBuffer`], so dropping the image releases
/// it from whichever region it was allocated in.
#[derive(Debug)]
pub struct RgbImage {
    width: u32,
    height: u32,
    pixels: HeapBuffer,
}

impl RgbImage {
    /// Allocate a black image.
    pub fn allocate(
        heap: &Arc<dyn ImageHeap>,
        region: MemoryRegion,
        width: u32,
        height: u32,
    ) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions);
        }
        let len = rgb888_len(width, height).ok_or(ImageError::InvalidDimensions)?;
        let pixels = HeapBuffer::zeroed(heap, region, len)?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing buffer, checking that its length matches.
    pub fn from_buffer(pixels: HeapBuffer, width: u32, height: u32) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || rgb888_len(width, height) != Some(pixels.len()) {
            return Err(ImageError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Region the pixel buffer was accounted against.
    pub fn region(&self) -> MemoryRegion {
        self.pixels.region()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Bytes per row (no padding).
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// One row of pixels.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// One row of pixels, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.pixels[start..start + stride]
    }

    /// The pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb888 {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        Rgb888::read(&self.pixels, y as usize * self.width as usize + x as usize)
    }

    /// Release the heap accounting and return the raw bytes.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels.into_vec()
    }
}
