//! Block-bounded PNG decoding.
//!
//! The `png` crate does the inflating and unfiltering; this module owns the
//! memory. Decoded scanlines land in a [`RowBlock`] of at most
//! `block_rows` RGBA rows, then only their RGB bytes are copied into the
//! output image. The block is allocated once and reused, so row memory
//! stays at `block_rows * width * 4` bytes no matter how tall the image is.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::ImageError;
use crate::memory::{AllocationStrategy, HeapBuffer, ImageHeap, MemoryRegion};
use crate::models::RgbImage;

/// Scanlines per block unless configured otherwise.
pub const DEFAULT_BLOCK_ROWS: usize = 128;

/// The eight bytes every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Bytes per pixel in a [`RowBlock`] row.
pub const ROW_CHANNELS: usize = 4;

/// A reusable block of RGBA scanlines.
#[derive(Debug)]
pub struct RowBlock {
    buf: HeapBuffer,
    row_len: usize,
    rows: usize,
}

impl RowBlock {
    pub fn allocate(
        heap: &Arc<dyn ImageHeap>,
        region: MemoryRegion,
        width: u32,
        rows: usize,
    ) -> Result<Self, ImageError> {
        let row_len = (width as usize)
            .checked_mul(ROW_CHANNELS)
            .ok_or(ImageError::InvalidDimensions)?;
        let len = row_len
            .checked_mul(rows)
            .ok_or(ImageError::InvalidDimensions)?;
        let buf = HeapBuffer::zeroed(heap, region, len)?;
        Ok(Self { buf, row_len, rows })
    }

    /// Number of rows the block holds.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total bytes held.
    pub fn byte_len(&self) -> usize {
        self.buf.len()
    }

    pub fn row(&self, index: usize) -> &[u8] {
        let start = index * self.row_len;
        &self.buf[start..start + self.row_len]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.row_len;
        &mut self.buf[start..start + self.row_len]
    }
}

/// A producer of RGBA scanlines, top row first.
pub trait RowSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Fill rows `0..count` of `block` with the next `count` scanlines.
    fn read_rows(&mut self, block: &mut RowBlock, count: usize) -> Result<(), ImageError>;

    /// Consume whatever trails the pixel data.
    fn finish(&mut self) -> Result<(), ImageError>;
}

/// Drive `source` through a bounded row block into a full RGB888 image.
///
/// The image is allocated in `strategy.image` and the block of
/// `min(block_rows, height)` rows in `strategy.row_block`. Both are
/// released if any step fails.
pub fn decode_rows<S: RowSource + ?Sized>(
    source: &mut S,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
    block_rows: usize,
) -> Result<RgbImage, ImageError> {
    let width = source.width();
    let height = source.height();
    if width == 0 || height == 0 {
        tracing::error!(width, height, "Image has zero size");
        return Err(ImageError::Format("image has zero size"));
    }

    let mut image = RgbImage::allocate(heap, strategy.image, width, height)?;
    let block_len = block_rows.max(1).min(height as usize);
    let mut block = RowBlock::allocate(heap, strategy.row_block, width, block_len)?;

    tracing::debug!(
        width,
        height,
        block_rows = block_len,
        block_bytes = block.byte_len(),
        "Streaming rows"
    );

    let mut y = 0u32;
    while y < height {
        let count = block_len.min((height - y) as usize);
        source.read_rows(&mut block, count)?;

        for i in 0..count {
            let src = block.row(i);
            let dst = image.row_mut(y + i as u32);
            for (rgb, rgba) in dst.chunks_exact_mut(3).zip(src.chunks_exact(ROW_CHANNELS)) {
                rgb.copy_from_slice(&rgba[..3]);
            }
        }
        y += count as u32;
    }

    source.finish()?;
    Ok(image)
}

fn map_png_error(err: png::DecodingError) -> ImageError {
    match err {
        png::DecodingError::IoError(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            ImageError::Format("truncated PNG stream")
        }
        png::DecodingError::IoError(e) => ImageError::Io(e),
        png::DecodingError::Format(e) => {
            tracing::error!(%e, "Corrupt PNG stream");
            ImageError::Format("corrupt PNG stream")
        }
        png::DecodingError::Parameter(e) => {
            tracing::error!(%e, "PNG decoder rejected parameters");
            ImageError::Format("invalid PNG parameters")
        }
        png::DecodingError::LimitsExceeded => {
            tracing::error!("PNG exceeds decoder limits");
            ImageError::UnsupportedFormat("PNG exceeds decoder limits")
        }
    }
}

/// [`RowSource`] backed by the `png` crate.
pub struct PngRowSource<R: Read> {
    reader: png::Reader<R>,
    color: png::ColorType,
}

impl<R: Read> PngRowSource<R> {
    /// Read the header chunks. Every row this source delivers is 8-bit
    /// RGBA: palettes and tRNS are expanded, 16-bit samples are stripped
    /// and missing alpha is filled opaque.
    pub fn new(stream: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(stream);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let reader = decoder.read_info().map_err(map_png_error)?;

        let info = reader.info();
        if info.interlaced {
            tracing::error!(width = info.width, height = info.height, "Interlaced PNG");
            return Err(ImageError::UnsupportedFormat("interlaced PNG is not supported"));
        }
        if info.width == 0 || info.height == 0 {
            return Err(ImageError::Format("image has zero size"));
        }

        let (color, depth) = reader.output_color_type();
        if depth != png::BitDepth::Eight || color == png::ColorType::Indexed {
            tracing::error!(?color, ?depth, "Unexpected PNG output layout");
            return Err(ImageError::UnsupportedFormat("PNG sample layout not supported"));
        }

        Ok(Self { reader, color })
    }
}

impl<R: Read> RowSource for PngRowSource<R> {
    fn width(&self) -> u32 {
        self.reader.info().width
    }

    fn height(&self) -> u32 {
        self.reader.info().height
    }

    fn read_rows(&mut self, block: &mut RowBlock, count: usize) -> Result<(), ImageError> {
        let color = self.color;
        for i in 0..count {
            let row = self
                .reader
                .next_row()
                .map_err(map_png_error)?
                .ok_or(ImageError::Format("PNG image data ended early"))?;
            expand_to_rgba(row.data(), color, block.row_mut(i));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ImageError> {
        self.reader.finish().map_err(map_png_error)
    }
}

fn expand_to_rgba(src: &[u8], color: png::ColorType, dst: &mut [u8]) {
    let pixels = dst.chunks_exact_mut(ROW_CHANNELS);
    match color {
        png::ColorType::Grayscale => {
            for (out, &g) in pixels.zip(src) {
                out.copy_from_slice(&[g, g, g, 0xFF]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            for (out, ga) in pixels.zip(src.chunks_exact(2)) {
                out.copy_from_slice(&[ga[0], ga[0], ga[0], ga[1]]);
            }
        }
        png::ColorType::Rgb => {
            for (out, rgb) in pixels.zip(src.chunks_exact(3)) {
                out.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 0xFF]);
            }
        }
        png::ColorType::Rgba => {
            let len = dst.len().min(src.len());
            dst[..len].copy_from_slice(&src[..len]);
        }
        // Rejected in `PngRowSource::new`
        png::ColorType::Indexed => {}
    }
}

/// Decode a PNG stream into an RGB888 image, `block_rows` scanlines at a
/// time. Alpha is discarded.
pub fn decode_png<R: Read>(
    mut reader: R,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
    block_rows: usize,
) -> Result<RgbImage, ImageError> {
    let mut signature = [0u8; 8];
    reader.read_exact(&mut signature).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ImageError::Format("truncated PNG signature"),
        _ => ImageError::Io(e),
    })?;
    if signature != PNG_SIGNATURE {
        tracing::error!(?signature, "Not a PNG stream");
        return Err(ImageError::Format("bad PNG signature"));
    }

    let mut source = PngRowSource::new(Cursor::new(signature).chain(reader))?;
    let image = decode_rows(&mut source, heap, strategy, block_rows)?;

    tracing::info!(width = image.width(), height = image.height(), "Decoded PNG");
    Ok(image)
}

/// Decode a PNG file from disk.
pub fn decode_png_file(
    path: &Path,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
    block_rows: usize,
) -> Result<RgbImage, ImageError> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), %e, "Failed to open PNG");
        ImageError::Io(e)
    })?;
    decode_png(BufReader::new(file), heap, strategy, block_rows)
}
