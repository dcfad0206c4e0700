//! Caching layers that sit on top of an [`Allocator`](crate::allocator::Allocator).
//!
//! - [`buffered`] - Size-bucketed reuse cache with a byte threshold

pub mod buffered;
