use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use crate::codec::png_stream::DEFAULT_BLOCK_ROWS;
use crate::memory::{AllocationStrategy, ImageHeap, MemoryRegion, SystemHeap, TrackingHeap};
use crate::models::DisplaySpec;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Target panel resolution
    #[serde(default)]
    pub display: DisplaySpec,

    /// Whether converted images are dithered to the six-color palette
    #[serde(default = "default_dither")]
    pub dither: bool,

    /// Decoder memory settings
    #[serde(default)]
    pub decode: DecodeConfig,
}

fn default_dither() -> bool {
    true
}

/// Memory settings for the decoders.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DecodeConfig {
    /// Scanlines decoded per block while streaming a PNG
    #[serde(default = "default_block_rows")]
    pub block_rows: usize,

    /// Region assignment per buffer role
    #[serde(default)]
    pub allocation: AllocationStrategy,

    /// Upper bound, in bytes, on live buffers in the large-capacity region
    #[serde(default)]
    pub large_region_capacity: Option<usize>,
}

fn default_block_rows() -> usize {
    DEFAULT_BLOCK_ROWS
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            block_rows: DEFAULT_BLOCK_ROWS,
            allocation: AllocationStrategy::default(),
            large_region_capacity: None,
        }
    }
}

impl DecodeConfig {
    /// Build the heap these settings describe: a capacity-limited
    /// [`TrackingHeap`] when `large_region_capacity` is set, otherwise the
    /// unaccounted [`SystemHeap`].
    pub fn heap(&self) -> Arc<dyn ImageHeap> {
        match self.large_region_capacity {
            Some(cap) => Arc::new(
                TrackingHeap::new().with_capacity(MemoryRegion::LargeCapacity, cap),
            ),
            None => Arc::new(SystemHeap),
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config.validated())
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// path is absent, unreadable or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        width = config.display.width,
                        height = config.display.height,
                        block_rows = config.decode.block_rows,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Replace values that cannot work with their defaults.
    fn validated(mut self) -> Self {
        if self.decode.block_rows == 0 {
            tracing::warn!(
                default = DEFAULT_BLOCK_ROWS,
                "decode.block_rows must be positive, using default"
            );
            self.decode.block_rows = DEFAULT_BLOCK_ROWS;
        }
        if self.display.width == 0 || self.display.height == 0 {
            tracing::warn!(
                width = self.display.width,
                height = self.display.height,
                "display size must be non-zero, using default"
            );
            self.display = DisplaySpec::default();
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplaySpec::default(),
            dither: true,
            decode: DecodeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.display, DisplaySpec::SIX_COLOR_7IN3);
        assert!(config.dither);
        assert_eq!(config.decode.block_rows, 128);
        assert_eq!(config.decode.allocation, AllocationStrategy::default());
        assert_eq!(config.decode.large_region_capacity, None);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
display:
  width: 600
  height: 448
dither: false
decode:
  block_rows: 32
  large_region_capacity: 8388608
  allocation:
    image: large-capacity
    row_block: general
    scratch: general
"#;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.display, DisplaySpec { width: 600, height: 448 });
        assert!(!config.dither);
        assert_eq!(config.decode.block_rows, 32);
        assert_eq!(config.decode.large_region_capacity, Some(8_388_608));
        assert_eq!(config.decode.allocation.row_block, MemoryRegion::General);
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let config = AppConfig::from_yaml_str("dither: true\n").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_display_keeps_other_fields() {
        let yaml = "display:\n  width: 600\ndither: false\ndecode:\n  block_rows: 8\n";
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.display, DisplaySpec { width: 600, height: 480 });
        assert!(!config.dither);
        assert_eq!(config.decode.block_rows, 8);
    }

    #[test]
    fn test_zero_block_rows_falls_back() {
        let config = AppConfig::from_yaml_str("decode:\n  block_rows: 0\n").unwrap();
        assert_eq!(config.decode.block_rows, DEFAULT_BLOCK_ROWS);
    }

    #[test]
    fn test_zero_display_falls_back() {
        let config = AppConfig::from_yaml_str("display:\n  width: 0\n  height: 10\n").unwrap();
        assert_eq!(config.display, DisplaySpec::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/config.yaml")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_none_uses_defaults() {
        assert_eq!(AppConfig::load(None), AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "decode:\n  block_rows: 16\n").unwrap();
        let config = AppConfig::load(Some(&path));
        assert_eq!(config.decode.block_rows, 16);
    }

    #[test]
    fn test_heap_with_capacity_refuses_large_claims() {
        let decode = DecodeConfig {
            large_region_capacity: Some(10),
            ..DecodeConfig::default()
        };
        let heap = decode.heap();
        assert!(heap.claim(MemoryRegion::LargeCapacity, 11).is_err());
        assert!(heap.claim(MemoryRegion::General, 11).is_ok());
    }
}
