//! Uncompressed 24-bit BMP decode and encode.
//!
//! Files are a 14-byte file header, a 40-byte info header and then rows of
//! B,G,R triples padded to a multiple of four bytes. A positive height means
//! the last image row is stored first.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

use crate::error::ImageError;
use crate::memory::{AllocationStrategy, HeapBuffer, ImageHeap};
use crate::models::{rgb888_len, RgbImage};

/// "BM" read as a little-endian u16.
pub const BMP_MAGIC: u16 = 0x4D42;

/// Offset of the pixel data in files written by [`encode_bmp`].
pub const PIXEL_DATA_OFFSET: u32 = (FileHeader::SIZE + InfoHeader::SIZE) as u32;

/// Bytes per stored row: three per pixel, rounded up to four.
pub fn row_stride(width: usize) -> usize {
    (width * 3 + 3) & !3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub file_type: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

impl FileHeader {
    pub const SIZE: usize = 14;

    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            file_type: u16::from_le_bytes([bytes[0], bytes[1]]),
            file_size: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            reserved1: u16::from_le_bytes([bytes[6], bytes[7]]),
            reserved2: u16::from_le_bytes([bytes[8], bytes[9]]),
            pixel_offset: u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..2].copy_from_slice(&self.file_type.to_le_bytes());
        out[2..6].copy_from_slice(&self.file_size.to_le_bytes());
        out[6..8].copy_from_slice(&self.reserved1.to_le_bytes());
        out[8..10].copy_from_slice(&self.reserved2.to_le_bytes());
        out[10..14].copy_from_slice(&self.pixel_offset.to_le_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

impl InfoHeader {
    pub const SIZE: usize = 40;

    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        let u32_at = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let i32_at = |i: usize| i32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);

        Self {
            header_size: u32_at(0),
            width: i32_at(4),
            height: i32_at(8),
            planes: u16_at(12),
            bit_count: u16_at(14),
            compression: u32_at(16),
            image_size: u32_at(20),
            x_pixels_per_meter: i32_at(24),
            y_pixels_per_meter: i32_at(28),
            colors_used: u32_at(32),
            colors_important: u32_at(36),
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.header_size.to_le_bytes());
        out[4..8].copy_from_slice(&self.width.to_le_bytes());
        out[8..12].copy_from_slice(&self.height.to_le_bytes());
        out[12..14].copy_from_slice(&self.planes.to_le_bytes());
        out[14..16].copy_from_slice(&self.bit_count.to_le_bytes());
        out[16..20].copy_from_slice(&self.compression.to_le_bytes());
        out[20..24].copy_from_slice(&self.image_size.to_le_bytes());
        out[24..28].copy_from_slice(&self.x_pixels_per_meter.to_le_bytes());
        out[28..32].copy_from_slice(&self.y_pixels_per_meter.to_le_bytes());
        out[32..36].copy_from_slice(&self.colors_used.to_le_bytes());
        out[36..40].copy_from_slice(&self.colors_important.to_le_bytes());
        out
    }

    /// Rows are stored top row first.
    pub fn is_top_down(&self) -> bool {
        self.height < 0
    }
}

/// Short reads mean a truncated file, anything else is an I/O failure.
fn read_exact_or_format<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), ImageError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ImageError::Format(what),
        _ => ImageError::Io(e),
    })
}

/// Decode a 24-bit uncompressed BMP from a seekable stream.
///
/// The output image lives in `strategy.image`, the per-row read buffer in
/// `strategy.scratch`.
pub fn decode_bmp<R: Read + Seek>(
    reader: &mut R,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
) -> Result<RgbImage, ImageError> {
    let mut file_bytes = [0u8; FileHeader::SIZE];
    read_exact_or_format(reader, &mut file_bytes, "truncated bitmap file header")?;
    let file_header = FileHeader::parse(&file_bytes);
    if file_header.file_type != BMP_MAGIC {
        tracing::error!(magic = file_header.file_type, "Not a BMP file");
        return Err(ImageError::Format("bad bitmap signature"));
    }

    let mut info_bytes = [0u8; InfoHeader::SIZE];
    read_exact_or_format(reader, &mut info_bytes, "truncated bitmap info header")?;
    let info = InfoHeader::parse(&info_bytes);

    if (info.header_size as usize) < InfoHeader::SIZE {
        tracing::error!(header_size = info.header_size, "Unsupported BMP header");
        return Err(ImageError::UnsupportedFormat("bitmap core headers are not supported"));
    }
    if info.bit_count != 24 {
        tracing::error!(bit_count = info.bit_count, "Unsupported BMP bit depth");
        return Err(ImageError::UnsupportedFormat("only 24-bit BMP is supported"));
    }
    if info.compression != 0 {
        tracing::error!(compression = info.compression, "Unsupported BMP compression");
        return Err(ImageError::UnsupportedFormat("compressed BMP is not supported"));
    }
    if info.width <= 0 || info.height == 0 {
        tracing::error!(width = info.width, height = info.height, "Invalid BMP dimensions");
        return Err(ImageError::Format("bitmap has zero or negative size"));
    }

    let width = info.width as u32;
    let height = info.height.unsigned_abs();
    let top_down = info.is_top_down();
    tracing::debug!(width, height, top_down, "Decoding BMP");

    let stride = row_stride(width as usize);
    let required = (stride as u64)
        .saturating_mul(u64::from(height))
        .saturating_add(u64::from(file_header.pixel_offset));
    let stream_len = reader.seek(SeekFrom::End(0))?;
    if stream_len < required {
        tracing::error!(width, height, stream_len, required, "BMP pixel data is short");
        return Err(ImageError::Format("truncated bitmap pixel data"));
    }

    let mut image = RgbImage::allocate(heap, strategy.image, width, height)?;
    let mut row = HeapBuffer::zeroed(heap, strategy.scratch, stride)?;

    reader.seek(SeekFrom::Start(u64::from(file_header.pixel_offset)))?;

    for stored in 0..height {
        read_exact_or_format(reader, &mut row, "truncated bitmap pixel data")?;
        let y = if top_down { stored } else { height - 1 - stored };
        let dst = image.row_mut(y);
        for (out, bgr) in dst.chunks_exact_mut(3).zip(row.chunks_exact(3)) {
            out[0] = bgr[2];
            out[1] = bgr[1];
            out[2] = bgr[0];
        }
    }

    tracing::info!(width, height, "Decoded BMP");
    Ok(image)
}

/// Decode a BMP file from disk.
pub fn decode_bmp_file(
    path: &Path,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
) -> Result<RgbImage, ImageError> {
    let file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), %e, "Failed to open BMP");
        ImageError::Io(e)
    })?;
    decode_bmp(&mut BufReader::new(file), heap, strategy)
}

/// Encode RGB888 pixels as a bottom-up 24-bit BMP.
pub fn encode_bmp<W: Write>(
    writer: &mut W,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    if width == 0 || height == 0 || rgb888_len(width, height) != Some(pixels.len()) {
        tracing::error!(width, height, len = pixels.len(), "BMP encode size mismatch");
        return Err(ImageError::InvalidDimensions);
    }
    let signed_width = i32::try_from(width).map_err(|_| ImageError::InvalidDimensions)?;
    let signed_height = i32::try_from(height).map_err(|_| ImageError::InvalidDimensions)?;

    let stride = row_stride(width as usize);
    let image_size = stride
        .checked_mul(height as usize)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or(ImageError::InvalidDimensions)?;
    let file_size = image_size
        .checked_add(PIXEL_DATA_OFFSET)
        .ok_or(ImageError::InvalidDimensions)?;

    let file_header = FileHeader {
        file_type: BMP_MAGIC,
        file_size,
        reserved1: 0,
        reserved2: 0,
        pixel_offset: PIXEL_DATA_OFFSET,
    };
    let info = InfoHeader {
        header_size: InfoHeader::SIZE as u32,
        width: signed_width,
        height: signed_height,
        planes: 1,
        bit_count: 24,
        compression: 0,
        image_size,
        x_pixels_per_meter: 0,
        y_pixels_per_meter: 0,
        colors_used: 0,
        colors_important: 0,
    };

    writer.write_all(&file_header.to_bytes())?;
    writer.write_all(&info.to_bytes())?;

    let src_stride = width as usize * 3;
    let mut row = vec![0u8; stride];
    for src in pixels.chunks_exact(src_stride).rev() {
        for (bgr, rgb) in row.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
            bgr[0] = rgb[2];
            bgr[1] = rgb[1];
            bgr[2] = rgb[0];
        }
        writer.write_all(&row)?;
    }

    tracing::debug!(width, height, bytes = file_size, "Encoded BMP");
    Ok(())
}

/// Encode RGB888 pixels to a BMP file, replacing it if it exists.
pub fn encode_bmp_file(
    path: &Path,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ImageError> {
    let file = File::create(path).map_err(|e| {
        tracing::error!(path = %path.display(), %e, "Failed to create BMP");
        ImageError::Io(e)
    })?;
    let mut writer = BufWriter::new(file);
    encode_bmp(&mut writer, pixels, width, height)?;
    writer.flush()?;
    Ok(())
}
