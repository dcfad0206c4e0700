//! The allocator capability and base allocators.
//!
//! Every layer in Membuf speaks the same three-operation contract:
//!
//! - [`Allocator::allocate`] - obtain a region of at least `size` bytes
//! - [`Allocator::free`] - hand a region back (ownership moves to the allocator)
//! - [`Allocator::is_alloc_thread_safe`] - whether concurrent calls are allowed
//!
//! Base allocators:
//!
//! - [`HeapAllocator`] - host memory with an optional capacity limit
//! - [`LockedAllocator`] - serializes calls into a non-reentrant allocator
//! - [`TrackingAllocator`] - counts calls and live bytes of the wrapped allocator

mod heap;
mod locked;
mod tracking;

pub use heap::HeapAllocator;
pub use locked::LockedAllocator;
pub use tracking::{TrackingAllocator, TrackingStats};

use std::sync::Arc;

use membuf_common::types::{Allocation, Attr};
use membuf_common::utils::error::Result;

/// A source of memory regions.
///
/// `Send + Sync` makes the handle shareable; whether the resource behind it
/// tolerates concurrent calls is a separate, declared property reported by
/// [`is_alloc_thread_safe`](Self::is_alloc_thread_safe). A driver binding can
/// be a perfectly safe Rust value and still require its callers to
/// serialize.
pub trait Allocator: Send + Sync {
    /// Allocates a region of at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory cannot be provided.
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation>;

    /// Releases a region previously returned by [`allocate`](Self::allocate).
    ///
    /// Passing an allocation that came from a different allocator is a
    /// contract violation; implementations are free to misbehave.
    fn free(&self, allocation: Allocation);

    /// Returns true if `allocate` and `free` may be called concurrently.
    fn is_alloc_thread_safe(&self) -> bool;

    /// Returns the name of this allocator for logs and reports.
    fn name(&self) -> &'static str {
        "allocator"
    }
}

impl<A: Allocator + ?Sized> Allocator for Arc<A> {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        (**self).allocate(size, attr)
    }

    fn free(&self, allocation: Allocation) {
        (**self).free(allocation);
    }

    fn is_alloc_thread_safe(&self) -> bool {
        (**self).is_alloc_thread_safe()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<A: Allocator + ?Sized> Allocator for Box<A> {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        (**self).allocate(size, attr)
    }

    fn free(&self, allocation: Allocation) {
        (**self).free(allocation);
    }

    fn is_alloc_thread_safe(&self) -> bool {
        (**self).is_alloc_thread_safe()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
