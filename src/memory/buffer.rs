use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use super::{ImageHeap, MemoryRegion};
use crate::error::ImageError;

/// A byte buffer accounted against a [`MemoryRegion`] of an [`ImageHeap`].
///
/// The claim is released when the buffer is dropped or turned into a plain
/// `Vec` with [`into_vec`](Self::into_vec). Allocation uses
/// `try_reserve_exact`, so running out of memory is an error, not an abort.
pub struct HeapBuffer {
    data: Vec<u8>,
    claimed: usize,
    region: MemoryRegion,
    heap: Arc<dyn ImageHeap>,
}

impl HeapBuffer {
    /// Allocate `len` zero bytes in `region`.
    pub fn zeroed(
        heap: &Arc<dyn ImageHeap>,
        region: MemoryRegion,
        len: usize,
    ) -> Result<Self, ImageError> {
        if let Err(e) = heap.claim(region, len) {
            tracing::error!(%region, bytes = len, "Heap refused buffer");
            return Err(e);
        }

        let mut data = Vec::new();
        if data.try_reserve_exact(len).is_err() {
            heap.release(region, len);
            tracing::error!(%region, bytes = len, "Buffer allocation failed");
            return Err(ImageError::Allocation(region));
        }
        data.resize(len, 0);

        Ok(Self {
            data,
            claimed: len,
            region,
            heap: Arc::clone(heap),
        })
    }

    /// Take ownership of an existing allocation (for example one produced
    /// by an external decoder) and account for it in `region`.
    ///
    /// If the heap refuses, `data` is dropped and the error returned.
    pub fn adopt(
        heap: &Arc<dyn ImageHeap>,
        region: MemoryRegion,
        data: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let len = data.len();
        if let Err(e) = heap.claim(region, len) {
            tracing::error!(%region, bytes = len, "Heap refused adopted buffer");
            return Err(e);
        }

        Ok(Self {
            data,
            claimed: len,
            region,
            heap: Arc::clone(heap),
        })
    }

    pub fn region(&self) -> MemoryRegion {
        self.region
    }

    /// Release the accounting and hand back the bytes.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.heap.release(self.region, self.claimed);
        self.claimed = 0;
        std::mem::take(&mut self.data)
    }
}

impl Deref for HeapBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for HeapBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for HeapBuffer {
    fn drop(&mut self) {
        if self.claimed > 0 {
            self.heap.release(self.region, self.claimed);
        }
    }
}

impl fmt::Debug for HeapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapBuffer")
            .field("len", &self.data.len())
            .field("region", &self.region)
            .finish()
    }
}
