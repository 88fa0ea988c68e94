use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use eink_dither::{dither_rgb888_with_workspace, resize_bilinear, FloydSteinberg, PALETTE};

use crate::codec::{self, ImageCrateJpeg, JpegEngine, DEFAULT_BLOCK_ROWS};
use crate::error::ImageError;
use crate::memory::{AllocationStrategy, HeapBuffer, ImageHeap};
use crate::models::{DecodeConfig, RgbImage};

/// Compressed formats the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
}

impl ImageFormat {
    /// Guess the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Png => f.write_str("png"),
            ImageFormat::Jpeg => f.write_str("jpeg"),
            ImageFormat::Bmp => f.write_str("bmp"),
        }
    }
}

/// Decode façade: dispatches on a caller-named format and applies the
/// configured heap, region placement and PNG block size to every buffer
/// it creates.
pub struct ImageDecoder {
    heap: Arc<dyn ImageHeap>,
    strategy: AllocationStrategy,
    block_rows: usize,
    jpeg: Box<dyn JpegEngine>,
}

impl ImageDecoder {
    pub fn new(heap: Arc<dyn ImageHeap>) -> Self {
        Self {
            heap,
            strategy: AllocationStrategy::default(),
            block_rows: DEFAULT_BLOCK_ROWS,
            jpeg: Box::new(ImageCrateJpeg),
        }
    }

    /// Build a decoder with the heap, placement and block size from
    /// configuration.
    pub fn from_config(config: &DecodeConfig) -> Self {
        Self::new(config.heap())
            .with_strategy(config.allocation)
            .with_block_rows(config.block_rows)
    }

    pub fn with_strategy(mut self, strategy: AllocationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the PNG block size. Zero is treated as one row.
    pub fn with_block_rows(mut self, block_rows: usize) -> Self {
        self.block_rows = block_rows.max(1);
        self
    }

    pub fn with_jpeg_engine(mut self, engine: Box<dyn JpegEngine>) -> Self {
        self.jpeg = engine;
        self
    }

    pub fn heap(&self) -> &Arc<dyn ImageHeap> {
        &self.heap
    }

    pub fn strategy(&self) -> &AllocationStrategy {
        &self.strategy
    }

    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    /// Decode `path` as `format`. The extension is not consulted.
    pub fn decode_file(&self, path: &Path, format: ImageFormat) -> Result<RgbImage, ImageError> {
        tracing::debug!(path = %path.display(), %format, "Decoding file");
        match format {
            ImageFormat::Png => self.decode_png_file(path),
            ImageFormat::Jpeg => self.decode_jpeg_file(path),
            ImageFormat::Bmp => self.decode_bmp_file(path),
        }
    }

    pub fn decode_png_file(&self, path: &Path) -> Result<RgbImage, ImageError> {
        codec::decode_png_file(path, &self.heap, &self.strategy, self.block_rows)
    }

    pub fn decode_png_reader<R: Read>(&self, reader: R) -> Result<RgbImage, ImageError> {
        codec::decode_png(reader, &self.heap, &self.strategy, self.block_rows)
    }

    pub fn decode_bmp_file(&self, path: &Path) -> Result<RgbImage, ImageError> {
        codec::decode_bmp_file(path, &self.heap, &self.strategy)
    }

    pub fn decode_jpeg_file(&self, path: &Path) -> Result<RgbImage, ImageError> {
        codec::decode_jpeg_file(self.jpeg.as_ref(), path, &self.heap, &self.strategy)
    }

    pub fn decode_jpeg(&self, data: &[u8]) -> Result<RgbImage, ImageError> {
        codec::decode_jpeg(self.jpeg.as_ref(), data, &self.heap, &self.strategy)
    }

    /// Bilinear-resample `src` to `width x height`.
    pub fn scale(&self, src: &RgbImage, width: u32, height: u32) -> Result<RgbImage, ImageError> {
        let mut out = RgbImage::allocate(&self.heap, self.strategy.image, width, height)?;
        resize_bilinear(
            src.pixels(),
            src.width() as usize,
            src.height() as usize,
            out.pixels_mut(),
            width as usize,
            height as usize,
        )
        .map_err(|e| ImageError::from_dither(e, self.strategy.image))?;

        tracing::debug!(
            from_width = src.width(),
            from_height = src.height(),
            width,
            height,
            "Scaled image"
        );
        Ok(out)
    }

    /// Floyd–Steinberg dither `src` onto the six-color palette.
    ///
    /// The error-diffusion copy lives in `strategy.scratch` and is released
    /// before this returns.
    pub fn dither(&self, src: &RgbImage) -> Result<RgbImage, ImageError> {
        let mut out = RgbImage::allocate(&self.heap, self.strategy.image, src.width(), src.height())?;
        let mut work = HeapBuffer::zeroed(&self.heap, self.strategy.scratch, src.pixels().len())?;

        dither_rgb888_with_workspace(
            &FloydSteinberg,
            src.pixels(),
            out.pixels_mut(),
            &mut work,
            src.width() as usize,
            src.height() as usize,
            &PALETTE,
        )
        .map_err(|e| ImageError::from_dither(e, self.strategy.scratch))?;

        tracing::debug!(width = src.width(), height = src.height(), "Dithered image");
        Ok(out)
    }

    /// Write `image` as a 24-bit BMP.
    pub fn encode_bmp_file(&self, image: &RgbImage, path: &Path) -> Result<(), ImageError> {
        codec::encode_bmp_file(path, image.pixels(), image.width(), image.height())?;
        tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "Wrote BMP");
        Ok(())
    }
}

impl fmt::Debug for ImageDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDecoder")
            .field("heap", &self.heap)
            .field("strategy", &self.strategy)
            .field("block_rows", &self.block_rows)
            .finish_non_exhaustive()
    }
}
