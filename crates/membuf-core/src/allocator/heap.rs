//! Host heap allocator.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use membuf_common::types::{Allocation, AllocationId, Attr};
use membuf_common::utils::error::{Error, Result};

use super::Allocator;

/// Allocates zero-filled host memory.
///
/// An optional capacity caps the number of bytes that may be live at once,
/// which makes the heap behave like a bounded device pool in tests and
/// simulations.
#[derive(Debug)]
pub struct HeapAllocator {
    /// Maximum live bytes, if bounded.
    capacity: Option<usize>,
    /// Bytes currently handed out.
    in_use: AtomicUsize,
    /// Next allocation ID.
    next_id: AtomicU64,
}

impl HeapAllocator {
    /// Creates an unbounded heap allocator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            capacity: None,
            in_use: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a heap allocator that refuses to hold more than `capacity`
    /// bytes at once.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    /// Returns the capacity limit, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Returns the number of bytes currently handed out.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Relaxed)
    }

    fn reserve(&self, size: usize, attr: Attr) -> Result<()> {
        let Some(capacity) = self.capacity else {
            self.in_use.fetch_add(size, Ordering::Relaxed);
            return Ok(());
        };

        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|&total| total <= capacity)
            })
            .map(|_| ())
            .map_err(|_| Error::OutOfMemory {
                requested: size,
                attr,
            })
    }

    fn release(&self, size: usize) {
        let _ = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(size))
            });
    }
}

impl Default for HeapAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for HeapAllocator {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        if size == 0 {
            return Err(Error::InvalidSize(size));
        }

        self.reserve(size, attr)?;

        let mut buffer = Vec::new();
        if buffer.try_reserve_exact(size).is_err() {
            self.release(size);
            return Err(Error::OutOfMemory {
                requested: size,
                attr,
            });
        }
        buffer.resize(size, 0u8);

        let id = AllocationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(Allocation::host(id, attr, buffer.into_boxed_slice()))
    }

    fn free(&self, allocation: Allocation) {
        self.release(allocation.size());
    }

    fn is_alloc_thread_safe(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "heap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_zeroed() {
        let heap = HeapAllocator::new();
        let alloc = heap.allocate(128, Attr::Default).unwrap();

        assert_eq!(alloc.size(), 128);
        assert!(alloc.as_slice().unwrap().iter().all(|&b| b == 0));
        assert_eq!(heap.in_use(), 128);

        heap.free(alloc);
        assert_eq!(heap.in_use(), 0);
    }

    #[test]
    fn test_ids_are_unique() {
        let heap = HeapAllocator::new();
        let a = heap.allocate(8, Attr::Default).unwrap();
        let b = heap.allocate(8, Attr::Default).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_zero_size_rejected() {
        let heap = HeapAllocator::new();
        assert!(matches!(
            heap.allocate(0, Attr::Default),
            Err(Error::InvalidSize(0))
        ));
    }

    #[test]
    fn test_capacity_limit() {
        let heap = HeapAllocator::with_capacity(100);

        let a = heap.allocate(60, Attr::Default).unwrap();
        let err = heap.allocate(50, Attr::FluxHuge).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfMemory {
                requested: 50,
                attr: Attr::FluxHuge
            }
        ));

        heap.free(a);
        assert!(heap.allocate(50, Attr::Default).is_ok());
    }

    #[test]
    fn test_attr_is_kept() {
        let heap = HeapAllocator::new();
        let alloc = heap.allocate(4, Attr::Tiny).unwrap();
        assert_eq!(alloc.attr(), Attr::Tiny);
        assert!(heap.is_alloc_thread_safe());
    }
}
