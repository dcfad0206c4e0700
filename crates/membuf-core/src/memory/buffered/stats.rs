//! Buffered allocator statistics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// Point-in-time statistics of a [`BufferedAllocator`](super::BufferedAllocator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferedStats {
    /// Bytes currently held in the cache.
    pub cached_bytes: usize,
    /// Allocations currently held in the cache.
    pub cached_blocks: usize,
    /// Configured flush threshold in bytes.
    pub threshold: usize,
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests forwarded to the underlying allocator.
    pub misses: u64,
    /// Full flushes triggered by the threshold.
    pub flushes: u64,
    /// Allocations released back to the underlying allocator.
    pub evicted_blocks: u64,
    /// Bytes released back to the underlying allocator.
    pub evicted_bytes: usize,
}

impl BufferedStats {
    /// Fraction of requests answered from the cache, 0.0 when idle.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Live counters behind [`BufferedStats`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) flushes: AtomicU64,
    pub(crate) evicted_blocks: AtomicU64,
    pub(crate) evicted_bytes: AtomicUsize,
}

impl Counters {
    pub(crate) fn record_eviction(&self, blocks: usize, bytes: usize) {
        self.evicted_blocks
            .fetch_add(blocks as u64, Ordering::Relaxed);
        self.evicted_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Fills the counter fields of `stats`.
    pub(crate) fn fill(&self, stats: &mut BufferedStats) {
        stats.hits = self.hits.load(Ordering::Relaxed);
        stats.misses = self.misses.load(Ordering::Relaxed);
        stats.flushes = self.flushes.load(Ordering::Relaxed);
        stats.evicted_blocks = self.evicted_blocks.load(Ordering::Relaxed);
        stats.evicted_bytes = self.evicted_bytes.load(Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_ratio() {
        let idle = BufferedStats::default();
        assert_eq!(idle.hit_ratio(), 0.0);

        let stats = BufferedStats {
            hits: 3,
            misses: 1,
            ..BufferedStats::default()
        };
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counters_fill() {
        let counters = Counters::default();
        counters.hits.fetch_add(2, Ordering::Relaxed);
        counters.record_eviction(3, 300);

        let mut stats = BufferedStats::default();
        counters.fill(&mut stats);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.evicted_blocks, 3);
        assert_eq!(stats.evicted_bytes, 300);
    }
}
