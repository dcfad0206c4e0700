//! Shared test allocator.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use membuf_common::{Allocation, AllocationId, Attr, Result};
use membuf_core::Allocator;
use parking_lot::Mutex;

/// Issues external allocations and records every release, in order.
#[derive(Default)]
pub struct RecordingAllocator {
    next_id: AtomicU64,
    allocations: AtomicU64,
    issued: Mutex<Vec<(AllocationId, usize)>>,
    released: Mutex<Vec<(AllocationId, usize)>>,
}

impl RecordingAllocator {
    pub fn allocations(&self) -> u64 {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn issued(&self) -> Vec<(AllocationId, usize)> {
        self.issued.lock().clone()
    }

    pub fn released(&self) -> Vec<(AllocationId, usize)> {
        self.released.lock().clone()
    }

    pub fn released_sizes(&self) -> Vec<usize> {
        self.released.lock().iter().map(|&(_, size)| size).collect()
    }

    pub fn release_count(&self) -> usize {
        self.released.lock().len()
    }
}

impl Allocator for RecordingAllocator {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        let id = AllocationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.issued.lock().push((id, size));
        Ok(Allocation::external(id, size, attr))
    }

    fn free(&self, allocation: Allocation) {
        self.released
            .lock()
            .push((allocation.id(), allocation.size()));
    }

    fn is_alloc_thread_safe(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
