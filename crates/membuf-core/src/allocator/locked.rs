//! Serializing wrapper for non-reentrant allocators.

use parking_lot::Mutex;

use membuf_common::types::{Allocation, Attr};
use membuf_common::utils::error::Result;

use super::Allocator;

/// Makes an allocator that forbids concurrent calls safe to share.
///
/// Every `allocate` and `free` runs under one mutex, so the wrapper always
/// reports itself as thread-safe.
pub struct LockedAllocator<A> {
    /// The wrapped allocator.
    inner: A,
    /// Serializes calls into `inner`.
    lock: Mutex<()>,
}

impl<A: Allocator> LockedAllocator<A> {
    /// Wraps `inner`.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }

    /// Returns the wrapped allocator.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: Allocator> Allocator for LockedAllocator<A> {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        let _guard = self.lock.lock();
        self.inner.allocate(size, attr)
    }

    fn free(&self, allocation: Allocation) {
        let _guard = self.lock.lock();
        self.inner.free(allocation);
    }

    fn is_alloc_thread_safe(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "locked"
    }
}
