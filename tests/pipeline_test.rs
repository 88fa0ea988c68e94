//! End-to-end conversion driven by YAML configuration.

mod common;

use std::sync::Arc;

use common::fixtures;
use epd_imgdecode::memory::SystemHeap;
use epd_imgdecode::models::AppConfig;
use epd_imgdecode::{ConversionPipeline, ImageDecoder, ImageFormat};
use pretty_assertions::assert_eq;

#[test]
fn test_png_to_panel_bmp() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = fixtures::gradient(32, 20);
    let input = fixtures::write_file(
        dir.path(),
        "in.png",
        &fixtures::png_bytes(32, 20, png::ColorType::Rgb, png::BitDepth::Eight, &pixels),
    );
    let output = dir.path().join("out.bmp");

    let config = AppConfig::from_yaml_str(
        r#"
display:
  width: 16
  height: 10
dither: true
decode:
  block_rows: 4
  large_region_capacity: 4096
"#,
    )
    .unwrap();

    let report = ConversionPipeline::from_config(&config)
        .convert(&input, ImageFormat::Png, &output)
        .unwrap();
    assert_eq!((report.source_width, report.source_height), (32, 20));
    assert_eq!((report.width, report.height), (16, 10));
    assert!(report.scaled && report.dithered);

    let written = ImageDecoder::new(Arc::new(SystemHeap))
        .decode_bmp_file(&output)
        .unwrap();
    assert_eq!((written.width(), written.height()), (16, 10));
    common::assert_palette_only(written.pixels());
}

#[test]
fn test_capacity_too_small_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let pixels = fixtures::gradient(32, 32);
    let input = fixtures::write_file(
        dir.path(),
        "in.png",
        &fixtures::png_bytes(32, 32, png::ColorType::Rgb, png::BitDepth::Eight, &pixels),
    );
    let output = dir.path().join("out.bmp");

    let config = AppConfig::from_yaml_str("decode:\n  large_region_capacity: 1024\n").unwrap();
    let result = ConversionPipeline::from_config(&config).convert(&input, ImageFormat::Png, &output);

    assert!(result.is_err());
    assert!(result.unwrap_err().is_allocation());
    assert!(!output.exists());
}

#[test]
fn test_config_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_file(
        dir.path(),
        "config.yaml",
        b"display:\n  width: 600\n  height: 448\ndither: false\n",
    );

    let config = AppConfig::load(Some(&path));
    assert_eq!((config.display.width, config.display.height), (600, 448));
    assert!(!config.dither);
    assert_eq!(config.decode.block_rows, 128);
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_file(dir.path(), "config.yaml", b"display: [not, a, map\n");

    assert_eq!(AppConfig::load(Some(&path)), AppConfig::default());
}
