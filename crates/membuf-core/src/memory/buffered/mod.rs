//! Buffered allocator with a size-bucketed reuse cache.
//!
//! Iterative numeric workloads allocate and free the same sizes over and
//! over. Freed allocations are parked in a size-ordered cache and handed
//! back out to later requests instead of going through the underlying
//! allocator again.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  BufferedAllocator                   │
//! │                                                      │
//! │   free ──► BucketCache (size ─► [Allocation])        │
//! │              64: [a, b]   256: [c]   4096: [d]       │
//! │                                                      │
//! │   allocate(n):                                       │
//! │     cached bytes > threshold ─► flush everything     │
//! │     smallest bucket >= n     ─► reuse                │
//! │     otherwise                ─► underlying.allocate  │
//! └──────────────────────────┬───────────────────────────┘
//!                            │
//!                ┌───────────▼───────────┐
//!                │ underlying Allocator  │
//!                └───────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use membuf_common::Attr;
//! use membuf_core::{Allocator, BufferedAllocator, HeapAllocator, Reclaim};
//!
//! let buffered = BufferedAllocator::new(Arc::new(HeapAllocator::new()), 64 * 1024 * 1024);
//!
//! let block = buffered.allocate(4096, Attr::Default)?;
//! let id = block.id();
//! buffered.free(block);
//!
//! // Same size again: served from the cache.
//! let again = buffered.allocate(4096, Attr::Default)?;
//! assert_eq!(again.id(), id);
//! buffered.free(again);
//!
//! // Give everything back to the heap.
//! buffered.free_cache(Reclaim::All);
//! # Ok::<(), membuf_common::Error>(())
//! ```

mod allocator;
mod cache;
mod config;
mod stats;

pub use allocator::{BufferedAllocator, BufferedAllocatorBuilder, Reclaim};
pub use config::{BufferedConfig, DEFAULT_THRESHOLD};
pub use stats::BufferedStats;
