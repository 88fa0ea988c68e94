//! JPEG decoding through a pluggable engine.
//!
//! The entropy decoding itself is delegated to a [`JpegEngine`]. This module
//! handles the input checks and brings the engine's output under heap
//! accounting.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::error::ImageError;
use crate::memory::{AllocationStrategy, HeapBuffer, ImageHeap};
use crate::models::{rgb888_len, RgbImage};

/// RGB888 output of a [`JpegEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedJpeg {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
#[error("JPEG engine error: {0}")]
pub struct JpegEngineError(pub String);

/// Decodes a complete in-memory JPEG to RGB888.
pub trait JpegEngine: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<DecodedJpeg, JpegEngineError>;
}

/// [`JpegEngine`] backed by the `image` crate's baseline/progressive decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateJpeg;

impl JpegEngine for ImageCrateJpeg {
    fn decode(&self, data: &[u8]) -> Result<DecodedJpeg, JpegEngineError> {
        let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
            .map_err(|e| JpegEngineError(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(DecodedJpeg {
            width,
            height,
            pixels: rgb.into_raw(),
        })
    }
}

/// Decode an in-memory JPEG. The engine's pixel buffer is adopted into
/// `strategy.image`.
pub fn decode_jpeg(
    engine: &dyn JpegEngine,
    data: &[u8],
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
) -> Result<RgbImage, ImageError> {
    if data.is_empty() {
        tracing::error!("JPEG input is empty");
        return Err(ImageError::Format("empty JPEG input"));
    }

    let decoded = engine.decode(data).map_err(|e| {
        tracing::error!(%e, input_len = data.len(), "JPEG decode failed");
        ImageError::Format("JPEG decode failed")
    })?;

    let DecodedJpeg {
        width,
        height,
        pixels,
    } = decoded;
    if width == 0 || height == 0 || rgb888_len(width, height) != Some(pixels.len()) {
        tracing::error!(width, height, len = pixels.len(), "JPEG engine returned inconsistent output");
        return Err(ImageError::Format("JPEG engine returned inconsistent output"));
    }

    let buffer = HeapBuffer::adopt(heap, strategy.image, pixels)?;
    let image = RgbImage::from_buffer(buffer, width, height)?;
    tracing::info!(width, height, "Decoded JPEG");
    Ok(image)
}

/// Read a JPEG file into a scratch buffer and decode it.
pub fn decode_jpeg_file(
    engine: &dyn JpegEngine,
    path: &Path,
    heap: &Arc<dyn ImageHeap>,
    strategy: &AllocationStrategy,
) -> Result<RgbImage, ImageError> {
    let mut file = File::open(path).map_err(|e| {
        tracing::error!(path = %path.display(), %e, "Failed to open JPEG");
        ImageError::Io(e)
    })?;

    let len = usize::try_from(file.metadata()?.len()).map_err(|_| ImageError::Format("JPEG file too large"))?;
    if len == 0 {
        tracing::error!(path = %path.display(), "JPEG file is empty");
        return Err(ImageError::Format("empty JPEG file"));
    }

    let mut data = HeapBuffer::zeroed(heap, strategy.scratch, len)?;
    file.read_exact(&mut data).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ImageError::Format("JPEG file shrank while reading"),
        _ => ImageError::Io(e),
    })?;

    decode_jpeg(engine, &data, heap, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryRegion, TrackingHeap};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed image and counts calls.
    #[derive(Default)]
    struct FixedEngine {
        calls: AtomicUsize,
        output: Option<DecodedJpeg>,
    }

    impl JpegEngine for FixedEngine {
        fn decode(&self, _data: &[u8]) -> Result<DecodedJpeg, JpegEngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.output
                .clone()
                .ok_or_else(|| JpegEngineError("no output".to_string()))
        }
    }

    fn tracking() -> (Arc<TrackingHeap>, Arc<dyn ImageHeap>) {
        let tracking = Arc::new(TrackingHeap::new());
        let heap: Arc<dyn ImageHeap> = tracking.clone();
        (tracking, heap)
    }

    #[test]
    fn test_empty_input_skips_engine() {
        let engine = FixedEngine::default();
        let (_, heap) = tracking();
        let result = decode_jpeg(&engine, &[], &heap, &AllocationStrategy::default());
        assert!(matches!(result, Err(ImageError::Format(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_engine_failure_is_format() {
        let engine = FixedEngine::default();
        let (tracking, heap) = tracking();
        let result = decode_jpeg(&engine, &[0xFF, 0xD8], &heap, &AllocationStrategy::default());
        assert!(matches!(result, Err(ImageError::Format(_))));
        assert_eq!(tracking.live_bytes(), 0);
    }

    #[test]
    fn test_output_is_adopted_into_image_region() {
        let engine = FixedEngine {
            output: Some(DecodedJpeg {
                width: 2,
                height: 1,
                pixels: vec![1, 2, 3, 4, 5, 6],
            }),
            ..FixedEngine::default()
        };
        let (tracking, heap) = tracking();
        let image = decode_jpeg(&engine, &[0xFF], &heap, &AllocationStrategy::default()).unwrap();

        assert_eq!(image.pixels(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(image.region(), MemoryRegion::LargeCapacity);
        assert_eq!(tracking.stats(MemoryRegion::LargeCapacity).live_bytes, 6);
    }

    #[test]
    fn test_inconsistent_engine_output() {
        let engine = FixedEngine {
            output: Some(DecodedJpeg {
                width: 2,
                height: 2,
                pixels: vec![0; 3],
            }),
            ..FixedEngine::default()
        };
        let (_, heap) = tracking();
        let result = decode_jpeg(&engine, &[0xFF], &heap, &AllocationStrategy::default());
        assert!(matches!(result, Err(ImageError::Format(_))));
    }

    #[test]
    fn test_empty_file_is_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let engine = FixedEngine::default();
        let (_, heap) = tracking();
        let result = decode_jpeg_file(&engine, &path, &heap, &AllocationStrategy::default());
        assert!(matches!(result, Err(ImageError::Format(_))));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_file_buffer_released_after_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

        let engine = FixedEngine {
            output: Some(DecodedJpeg {
                width: 1,
                height: 1,
                pixels: vec![9, 9, 9],
            }),
            ..FixedEngine::default()
        };
        let (tracking, heap) = tracking();
        let image = decode_jpeg_file(&engine, &path, &heap, &AllocationStrategy::default()).unwrap();

        assert_eq!(image.pixels(), &[9, 9, 9]);
        let scratch = tracking.stats(MemoryRegion::General);
        assert_eq!(scratch.peak_bytes, 4);
        assert_eq!(scratch.live_bytes, 0);
    }

    #[test]
    fn test_image_crate_rejects_garbage() {
        let result = ImageCrateJpeg.decode(b"definitely not a jpeg");
        assert!(result.is_err());
    }

    #[test]
    fn test_image_crate_decodes_encoded_jpeg() {
        let source = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 40, 40]));
        let mut bytes = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 95)
            .encode_image(&source)
            .unwrap();

        let decoded = ImageCrateJpeg.decode(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (8, 8));
        assert_eq!(decoded.pixels.len(), 8 * 8 * 3);
        for px in decoded.pixels.chunks_exact(3) {
            assert!(px[0] > 150 && px[1] < 90 && px[2] < 90, "{px:?}");
        }
    }
}
