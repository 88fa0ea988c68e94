use std::fmt;
use std::sync::{Mutex, MutexGuard};

use super::MemoryRegion;
use crate::error::ImageError;

/// Accounting hook consulted before every image buffer allocation.
///
/// `claim` may refuse (returning [`ImageError::Allocation`]); a successful
/// claim is always paired with exactly one `release` of the same size,
/// which [`HeapBuffer`](super::HeapBuffer) guarantees through `Drop`.
pub trait ImageHeap: Send + Sync + fmt::Debug {
    fn claim(&self, region: MemoryRegion, bytes: usize) -> Result<(), ImageError>;
    fn release(&self, region: MemoryRegion, bytes: usize);
}

/// Heap that never refuses and keeps no books.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHeap;

impl ImageHeap for SystemHeap {
    fn claim(&self, _region: MemoryRegion, _bytes: usize) -> Result<(), ImageError> {
        Ok(())
    }

    fn release(&self, _region: MemoryRegion, _bytes: usize) {}
}

/// Per-region counters kept by [`TrackingHeap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionStats {
    /// Bytes currently claimed.
    pub live_bytes: usize,
    /// Highest `live_bytes` ever reached.
    pub peak_bytes: usize,
    /// Buffers currently alive.
    pub live_allocations: usize,
    /// Successful claims since creation.
    pub total_allocations: usize,
    /// Claims refused because they would exceed the capacity.
    pub refused_allocations: usize,
}

/// Heap that counts live and peak bytes per region and can enforce a
/// capacity on each.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use epd_imgdecode::memory::{HeapBuffer, ImageHeap, MemoryRegion, TrackingHeap};
///
/// let tracking = Arc::new(TrackingHeap::new().with_capacity(MemoryRegion::LargeCapacity, 1024));
/// let heap: Arc<dyn ImageHeap> = tracking.clone();
///
/// let buf = HeapBuffer::zeroed(&heap, MemoryRegion::LargeCapacity, 1000).unwrap();
/// assert_eq!(tracking.stats(MemoryRegion::LargeCapacity).live_bytes, 1000);
/// assert!(HeapBuffer::zeroed(&heap, MemoryRegion::LargeCapacity, 100).is_err());
///
/// drop(buf);
/// assert_eq!(tracking.live_bytes(), 0);
/// ```
#[derive(Debug, Default)]
pub struct TrackingHeap {
    capacity: [Option<usize>; 2],
    stats: Mutex<[RegionStats; 2]>,
}

impl TrackingHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the bytes that may be live in `region` at once.
    pub fn with_capacity(mut self, region: MemoryRegion, bytes: usize) -> Self {
        self.capacity[region.slot()] = Some(bytes);
        self
    }

    /// Snapshot of the counters for one region.
    pub fn stats(&self, region: MemoryRegion) -> RegionStats {
        self.lock()[region.slot()]
    }

    /// Live bytes summed over all regions.
    pub fn live_bytes(&self) -> usize {
        self.lock().iter().map(|s| s.live_bytes).sum()
    }

    /// Live buffers summed over all regions.
    pub fn live_allocations(&self) -> usize {
        self.lock().iter().map(|s| s.live_allocations).sum()
    }

    fn lock(&self) -> MutexGuard<'_, [RegionStats; 2]> {
        // Counters stay consistent even if a holder panicked.
        self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ImageHeap for TrackingHeap {
    fn claim(&self, region: MemoryRegion, bytes: usize) -> Result<(), ImageError> {
        let mut stats = self.lock();
        let s = &mut stats[region.slot()];

        let next = s.live_bytes.checked_add(bytes);
        let fits = match (next, self.capacity[region.slot()]) {
            (None, _) => false,
            (Some(n), Some(cap)) => n <= cap,
            (Some(_), None) => true,
        };
        if !fits {
            s.refused_allocations += 1;
            tracing::debug!(%region, bytes, live = s.live_bytes, "Heap claim refused");
            return Err(ImageError::Allocation(region));
        }

        s.live_bytes += bytes;
        s.peak_bytes = s.peak_bytes.max(s.live_bytes);
        s.live_allocations += 1;
        s.total_allocations += 1;
        Ok(())
    }

    fn release(&self, region: MemoryRegion, bytes: usize) {
        let mut stats = self.lock();
        let s = &mut stats[region.slot()];
        s.live_bytes = s.live_bytes.saturating_sub(bytes);
        s.live_allocations = s.live_allocations.saturating_sub(1);
    }
}
