//! Memory regions and scoped image buffers.
//!
//! Image-sized buffers are placed in one of two [`MemoryRegion`]s, chosen
//! per buffer role by an [`AllocationStrategy`]. Every buffer is a
//! [`HeapBuffer`] which reports its size to an [`ImageHeap`] when created
//! and releases it when dropped, so error paths cannot leak accounting.

mod buffer;
mod heap;
mod region;

pub use buffer::HeapBuffer;
pub use heap::{ImageHeap, RegionStats, SystemHeap, TrackingHeap};
pub use region::{AllocationStrategy, MemoryRegion};
