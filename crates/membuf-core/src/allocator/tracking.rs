//! Call and byte accounting for an allocator.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

use membuf_common::types::{Allocation, Attr};
use membuf_common::utils::error::Result;

use super::Allocator;

/// Snapshot of a [`TrackingAllocator`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackingStats {
    /// Successful `allocate` calls.
    pub allocations: u64,
    /// Failed `allocate` calls.
    pub failed_allocations: u64,
    /// `free` calls.
    pub frees: u64,
    /// Bytes allocated and not yet freed.
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes: usize,
}

impl TrackingStats {
    /// Allocations that have not been freed yet.
    pub fn live_allocations(&self) -> u64 {
        self.allocations.saturating_sub(self.frees)
    }
}

/// Pass-through wrapper that records what reaches the wrapped allocator.
///
/// Placed under a caching layer it shows how many requests actually hit the
/// expensive allocator.
pub struct TrackingAllocator<A> {
    inner: A,
    allocations: AtomicU64,
    failed_allocations: AtomicU64,
    frees: AtomicU64,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Wraps `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            allocations: AtomicU64::new(0),
            failed_allocations: AtomicU64::new(0),
            frees: AtomicU64::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// Returns the wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> TrackingStats {
        TrackingStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            failed_allocations: self.failed_allocations.load(Ordering::Relaxed),
            frees: self.frees.load(Ordering::Relaxed),
            live_bytes: self.live_bytes.load(Ordering::Relaxed),
            peak_bytes: self.peak_bytes.load(Ordering::Relaxed),
        }
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        match self.inner.allocate(size, attr) {
            Ok(allocation) => {
                self.allocations.fetch_add(1, Ordering::Relaxed);
                let live = self
                    .live_bytes
                    .fetch_add(allocation.size(), Ordering::Relaxed)
                    + allocation.size();
                self.peak_bytes.fetch_max(live, Ordering::Relaxed);
                Ok(allocation)
            }
            Err(e) => {
                self.failed_allocations.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }

    fn free(&self, allocation: Allocation) {
        self.frees.fetch_add(1, Ordering::Relaxed);
        self.live_bytes
            .fetch_sub(allocation.size(), Ordering::Relaxed);
        self.inner.free(allocation);
    }

    fn is_alloc_thread_safe(&self) -> bool {
        self.inner.is_alloc_thread_safe()
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
