use std::path::Path;

use crate::error::ImageError;
use crate::models::{AppConfig, DisplaySpec};
use crate::services::{ImageDecoder, ImageFormat};

/// Outcome of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    /// Size of the decoded input
    pub source_width: u32,
    pub source_height: u32,
    /// Size of the written BMP
    pub width: u32,
    pub height: u32,
    pub scaled: bool,
    pub dithered: bool,
}

/// Decode → fit to the panel → dither → BMP.
#[derive(Debug)]
pub struct ConversionPipeline {
    decoder: ImageDecoder,
    display: DisplaySpec,
    dither: bool,
}

impl ConversionPipeline {
    pub fn new(decoder: ImageDecoder, display: DisplaySpec, dither: bool) -> Self {
        Self {
            decoder,
            display,
            dither,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            ImageDecoder::from_config(&config.decode),
            config.display,
            config.dither,
        )
    }

    pub fn decoder(&self) -> &ImageDecoder {
        &self.decoder
    }

    pub fn display(&self) -> DisplaySpec {
        self.display
    }

    /// Convert `input` (decoded as `format`) into a panel-ready BMP at
    /// `output`.
    ///
    /// Each intermediate image is dropped as soon as the next stage has
    /// produced its replacement, so at most two full frames are live.
    pub fn convert(
        &self,
        input: &Path,
        format: ImageFormat,
        output: &Path,
    ) -> Result<ConversionReport, ImageError> {
        let mut image = self.decoder.decode_file(input, format)?;
        let (source_width, source_height) = (image.width(), image.height());
        tracing::info!(
            input = %input.display(),
            %format,
            width = source_width,
            height = source_height,
            "Decoded input"
        );

        let scaled = !self.display.matches(source_width, source_height);
        if scaled {
            image = self
                .decoder
                .scale(&image, self.display.width, self.display.height)?;
            tracing::info!(
                width = self.display.width,
                height = self.display.height,
                "Scaled to display"
            );
        }

        if self.dither {
            image = self.decoder.dither(&image)?;
            tracing::info!("Dithered to six-color palette");
        }

        self.decoder.encode_bmp_file(&image, output)?;

        Ok(ConversionReport {
            source_width,
            source_height,
            width: image.width(),
            height: image.height(),
            scaled,
            dithered: self.dither,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::memory::{ImageHeap, SystemHeap, TrackingHeap};
    use eink_dither::PALETTE;
    use std::sync::Arc;

    fn pipeline(heap: Arc<dyn ImageHeap>, width: u32, height: u32, dither: bool) -> ConversionPipeline {
        ConversionPipeline::new(
            ImageDecoder::new(heap),
            DisplaySpec::new(width, height).unwrap(),
            dither,
        )
    }

    #[test]
    fn test_convert_scales_and_dithers() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        let output = dir.path().join("out.bmp");
        let pixels: Vec<u8> = (0..8 * 6 * 3).map(|i| (i * 7 % 256) as u8).collect();
        codec::encode_bmp_file(&input, &pixels, 8, 6).unwrap();

        let tracking = Arc::new(TrackingHeap::new());
        let report = pipeline(tracking.clone(), 4, 3, true)
            .convert(&input, ImageFormat::Bmp, &output)
            .unwrap();

        assert_eq!(
            report,
            ConversionReport {
                source_width: 8,
                source_height: 6,
                width: 4,
                height: 3,
                scaled: true,
                dithered: true,
            }
        );
        assert_eq!(tracking.live_bytes(), 0);

        let decoder = ImageDecoder::new(Arc::new(SystemHeap));
        let written = decoder.decode_bmp_file(&output).unwrap();
        assert_eq!((written.width(), written.height()), (4, 3));
        for px in written.pixels().chunks_exact(3) {
            assert!(
                PALETTE.iter().any(|(_, c)| c.to_bytes() == [px[0], px[1], px[2]]),
                "{px:?} is not a palette color"
            );
        }
    }

    #[test]
    fn test_convert_matching_size_without_dither_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.bmp");
        let output = dir.path().join("out.bmp");
        let pixels = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
        codec::encode_bmp_file(&input, &pixels, 2, 2).unwrap();

        let report = pipeline(Arc::new(SystemHeap), 2, 2, false)
            .convert(&input, ImageFormat::Bmp, &output)
            .unwrap();

        assert!(!report.scaled);
        assert!(!report.dithered);
        assert_eq!(std::fs::read(&input).unwrap(), std::fs::read(&output).unwrap());
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = AppConfig::from_yaml_str(
            "display:\n  width: 600\n  height: 448\ndecode:\n  block_rows: 16\n  allocation:\n    scratch: large-capacity\n",
        )
        .unwrap();
        let pipeline = ConversionPipeline::from_config(&config);

        assert_eq!(pipeline.display(), DisplaySpec { width: 600, height: 448 });
        assert_eq!(pipeline.decoder().block_rows(), 16);
        assert_eq!(
            pipeline.decoder().strategy().scratch,
            crate::memory::MemoryRegion::LargeCapacity
        );
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = pipeline(Arc::new(SystemHeap), 2, 2, true).convert(
            &dir.path().join("missing.png"),
            ImageFormat::Png,
            &dir.path().join("out.bmp"),
        );
        assert!(matches!(result, Err(ImageError::Io(_))));
        assert!(!dir.path().join("out.bmp").exists());
    }
}
