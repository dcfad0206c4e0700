//! # membuf-core
//!
//! Core layer for Membuf: the allocator capability, base allocators, and the
//! buffered reuse cache.
//!
//! This crate depends only on `membuf-common`.
//!
//! ## Modules
//!
//! - [`allocator`] - The [`Allocator`] trait and base allocators (heap, locked, tracking)
//! - [`memory`] - Caching layers over an allocator ([`BufferedAllocator`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod allocator;
pub mod memory;

// Re-export commonly used types
pub use allocator::{Allocator, HeapAllocator, LockedAllocator, TrackingAllocator, TrackingStats};
pub use memory::buffered::{
    BufferedAllocator, BufferedAllocatorBuilder, BufferedConfig, BufferedStats, DEFAULT_THRESHOLD,
    Reclaim,
};
