//! Test fixtures: in-memory images and heaps.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use epd_imgdecode::memory::{ImageHeap, TrackingHeap};

/// The four-pixel scene used across the BMP tests:
/// red, green on top; blue, yellow below.
pub const QUAD_2X2: [u8; 12] = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 0];

/// A tracking heap plus the same heap as a trait object.
pub fn tracking_heap() -> (Arc<TrackingHeap>, Arc<dyn ImageHeap>) {
    let tracking = Arc::new(TrackingHeap::new());
    let heap: Arc<dyn ImageHeap> = tracking.clone();
    (tracking, heap)
}

/// Deterministic RGB888 content with no flat runs.
pub fn gradient(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            out.push((x * 255 / (width - 1).max(1)) as u8);
            out.push((y * 255 / (height - 1).max(1)) as u8);
            out.push(((x * 7 + y * 13) % 256) as u8);
        }
    }
    out
}

/// Encode raw samples as a PNG.
pub fn png_bytes(
    width: u32,
    height: u32,
    color: png::ColorType,
    depth: png::BitDepth,
    data: &[u8],
) -> Vec<u8> {
    png_bytes_with(width, height, color, depth, data, None, None)
}

/// Encode raw samples as a PNG with optional PLTE and tRNS chunks.
pub fn png_bytes_with(
    width: u32,
    height: u32,
    color: png::ColorType,
    depth: png::BitDepth,
    data: &[u8],
    palette: Option<Vec<u8>>,
    trns: Option<Vec<u8>>,
) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        if let Some(palette) = palette {
            encoder.set_palette(palette);
        }
        if let Some(trns) = trns {
            encoder.set_trns(trns);
        }
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

/// Set the interlace flag in an encoded PNG's IHDR and fix up its CRC.
pub fn mark_interlaced(mut png: Vec<u8>) -> Vec<u8> {
    // signature (8) + length (4) + "IHDR" (4) + 12 bytes before the flag
    const INTERLACE_OFFSET: usize = 28;
    png[INTERLACE_OFFSET] = 1;
    let crc = crc32(&png[12..29]);
    png[29..33].copy_from_slice(&crc.to_be_bytes());
    png
}

/// Byte offset of the first chunk type tag `tag` in an encoded PNG.
pub fn chunk_offset(png: &[u8], tag: &[u8; 4]) -> usize {
    png.windows(4).position(|w| w == tag).unwrap()
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Encode RGB888 pixels as a baseline JPEG.
pub fn jpeg_bytes(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let source = image::RgbImage::from_raw(width, height, pixels.to_vec()).unwrap();
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 95)
        .encode_image(&source)
        .unwrap();
    out
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}
