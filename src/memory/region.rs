use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a buffer lives.
///
/// On boards with external PSRAM the large-capacity region is that PSRAM;
/// `General` is the default allocator. On a desktop both map to the
/// system allocator and the distinction only shows up in accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryRegion {
    /// The default heap.
    General,
    /// A pool set aside for sizable image buffers.
    LargeCapacity,
}

impl MemoryRegion {
    pub(crate) fn slot(self) -> usize {
        match self {
            MemoryRegion::General => 0,
            MemoryRegion::LargeCapacity => 1,
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryRegion::General => f.write_str("general"),
            MemoryRegion::LargeCapacity => f.write_str("large-capacity"),
        }
    }
}

/// Region assignment for each kind of buffer the decoders allocate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationStrategy {
    /// Full-resolution RGB888 output (decode, scale and dither results).
    pub image: MemoryRegion,
    /// The bounded block of scanlines used while streaming a PNG.
    pub row_block: MemoryRegion,
    /// Small or short-lived buffers: the BMP row buffer and the dithering
    /// working copy.
    pub scratch: MemoryRegion,
}

impl Default for AllocationStrategy {
    fn default() -> Self {
        Self {
            image: MemoryRegion::LargeCapacity,
            row_block: MemoryRegion::LargeCapacity,
            scratch: MemoryRegion::General,
        }
    }
}

impl AllocationStrategy {
    /// Put every buffer in one region.
    pub fn uniform(region: MemoryRegion) -> Self {
        Self {
            image: region,
            row_block: region,
            scratch: region,
        }
    }
}
