//! The buffered allocator.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use smallvec::SmallVec;

use membuf_common::types::{Allocation, Attr};
use membuf_common::utils::error::Result;

use super::cache::BucketCache;
use super::config::BufferedConfig;
use super::stats::{BufferedStats, Counters};
use crate::allocator::Allocator;

/// Allocations detached from the cache, waiting to be released.
type Evicted = SmallVec<[Allocation; 8]>;

/// How much of the cache [`BufferedAllocator::free_cache`] should release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclaim {
    /// Release largest-first until at least this many bytes are freed.
    Bytes(usize),
    /// Release everything.
    All,
}

/// Caches freed allocations by size and reuses them for later requests.
///
/// A request is served by the smallest cached allocation that is at least
/// as large as asked for, so callers must only rely on
/// `allocation.size() >= requested`. Freed allocations stay cached until an
/// allocation request finds more than `threshold` bytes cached (the whole
/// cache is then released and the request misses), until
/// [`free_cache`](Self::free_cache), or until the allocator is dropped.
///
/// Only allocations obtained through this allocator may be passed to
/// [`free`](Allocator::free); anything else ends up released to an
/// underlying allocator that never issued it.
pub struct BufferedAllocator {
    /// Where cache misses go and evicted allocations return to.
    underlying: Arc<dyn Allocator>,
    /// Freed allocations available for reuse.
    cache: Mutex<BucketCache>,
    /// Sum of the sizes in `cache`; only modified while `cache` is locked.
    cached_bytes: AtomicUsize,
    /// Cached bytes tolerated before the next allocation flushes the cache.
    threshold: usize,
    /// Whether `underlying` declared itself safe for concurrent calls.
    thread_safe: bool,
    /// Hit/miss/eviction counters.
    counters: Counters,
}

impl BufferedAllocator {
    /// Wraps `underlying` with a cache of at most `threshold` bytes.
    ///
    /// A negative threshold selects [`DEFAULT_THRESHOLD`](super::DEFAULT_THRESHOLD).
    #[must_use]
    pub fn new(underlying: Arc<dyn Allocator>, threshold: i64) -> Self {
        Self::with_config(
            underlying,
            &BufferedConfig::default().with_threshold(threshold),
        )
    }

    /// Wraps `underlying` using `config`.
    #[must_use]
    pub fn with_config(underlying: Arc<dyn Allocator>, config: &BufferedConfig) -> Self {
        let threshold = config.effective_threshold();
        let thread_safe = underlying.is_alloc_thread_safe();

        tracing::debug!(
            underlying = underlying.name(),
            threshold,
            thread_safe,
            "created buffered allocator"
        );

        Self {
            underlying,
            cache: Mutex::new(BucketCache::new()),
            cached_bytes: AtomicUsize::new(0),
            threshold,
            thread_safe,
            counters: Counters::default(),
        }
    }

    /// Returns a builder.
    pub fn builder() -> BufferedAllocatorBuilder {
        BufferedAllocatorBuilder::default()
    }

    /// Returns the underlying allocator.
    pub fn underlying(&self) -> &Arc<dyn Allocator> {
        &self.underlying
    }

    /// Returns the flush threshold in bytes.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the number of bytes currently cached.
    pub fn cached_bytes(&self) -> usize {
        self.cached_bytes.load(Ordering::Acquire)
    }

    /// Returns the number of allocations currently cached.
    pub fn cached_blocks(&self) -> usize {
        self.cache.lock().len()
    }

    /// Returns a statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> BufferedStats {
        let (cached_bytes, cached_blocks) = {
            let cache = self.cache.lock();
            (self.cached_bytes.load(Ordering::Acquire), cache.len())
        };

        let mut stats = BufferedStats {
            cached_bytes,
            cached_blocks,
            threshold: self.threshold,
            ..BufferedStats::default()
        };
        self.counters.fill(&mut stats);
        stats
    }

    /// Releases cached allocations to the underlying allocator, largest
    /// first, and returns the number of bytes released.
    ///
    /// With [`Reclaim::Bytes`] it stops as soon as the released total
    /// reaches the target, so it can release more than asked for but never
    /// more allocations than needed. `Reclaim::Bytes(0)` does nothing.
    pub fn free_cache(&self, reclaim: Reclaim) -> usize {
        if reclaim == Reclaim::Bytes(0) {
            return 0;
        }

        let evicted = {
            let mut cache = self.cache.lock();
            self.evict_locked(&mut cache, reclaim)
        };

        let released = self.release(evicted);
        tracing::debug!(?reclaim, released, "reclaimed buffered cache");
        released
    }

    /// Detaches cached allocations, largest first, until `reclaim` is met.
    ///
    /// The caller holds the cache lock; `cached_bytes` is updated here so it
    /// matches the cache by the time the lock is released.
    fn evict_locked(&self, cache: &mut BucketCache, reclaim: Reclaim) -> Evicted {
        let target = match reclaim {
            Reclaim::Bytes(bytes) => bytes,
            Reclaim::All => usize::MAX,
        };

        let mut evicted = Evicted::new();
        let mut freed = 0usize;
        while freed < target {
            let Some(allocation) = cache.pop_largest() else {
                break;
            };
            freed = freed.saturating_add(allocation.size());
            self.cached_bytes
                .fetch_sub(allocation.size(), Ordering::AcqRel);
            evicted.push(allocation);
        }
        evicted
    }

    /// Hands detached allocations back to the underlying allocator.
    fn release(&self, evicted: Evicted) -> usize {
        let blocks = evicted.len();
        let mut bytes = 0usize;
        for allocation in evicted {
            bytes = bytes.saturating_add(allocation.size());
            self.underlying.free(allocation);
        }
        if blocks > 0 {
            self.counters.record_eviction(blocks, bytes);
        }
        bytes
    }
}

impl Allocator for BufferedAllocator {
    fn allocate(&self, size: usize, attr: Attr) -> Result<Allocation> {
        // Every cached block would satisfy a zero-byte request; do not burn one.
        if size == 0 {
            return self.underlying.allocate(size, attr);
        }

        let evicted = {
            let mut cache = self.cache.lock();

            if self.cached_bytes.load(Ordering::Acquire) > self.threshold {
                self.counters.flushes.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                self.evict_locked(&mut cache, Reclaim::All)
            } else if let Some(allocation) = cache.take_at_least(size) {
                self.cached_bytes
                    .fetch_sub(allocation.size(), Ordering::AcqRel);
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    requested = size,
                    size = allocation.size(),
                    id = %allocation.id(),
                    "buffered cache hit"
                );
                return Ok(allocation);
            } else {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                Evicted::new()
            }
        };

        if !evicted.is_empty() {
            let blocks = evicted.len();
            let released = self.release(evicted);
            tracing::debug!(
                blocks,
                released,
                threshold = self.threshold,
                "buffered cache over threshold, flushed"
            );
        }

        tracing::trace!(requested = size, %attr, "buffered cache miss");
        self.underlying.allocate(size, attr)
    }

    fn free(&self, allocation: Allocation) {
        let mut cache = self.cache.lock();
        self.cached_bytes
            .fetch_add(allocation.size(), Ordering::AcqRel);
        cache.insert(allocation);
    }

    fn is_alloc_thread_safe(&self) -> bool {
        self.thread_safe
    }

    fn name(&self) -> &'static str {
        "buffered"
    }
}

impl Drop for BufferedAllocator {
    fn drop(&mut self) {
        if !self.cache.get_mut().is_empty() {
            self.free_cache(Reclaim::All);
        }
    }
}

/// Builder for [`BufferedAllocator`].
#[derive(Default)]
pub struct BufferedAllocatorBuilder {
    underlying: Option<Arc<dyn Allocator>>,
    config: BufferedConfig,
}

impl BufferedAllocatorBuilder {
    /// Sets the allocator that cache misses are forwarded to.
    pub fn underlying(mut self, underlying: Arc<dyn Allocator>) -> Self {
        self.underlying = Some(underlying);
        self
    }

    /// Sets the flush threshold in bytes. Negative values select the default.
    pub fn threshold(mut self, threshold: i64) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: BufferedConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the allocator.
    ///
    /// # Panics
    ///
    /// Panics if no underlying allocator was set. A buffered allocator
    /// without one is a wiring mistake, not a runtime condition.
    #[must_use]
    pub fn build(self) -> BufferedAllocator {
        let underlying = self
            .underlying
            .expect("underlying allocator of BufferedAllocator must be set");
        BufferedAllocator::with_config(underlying, &self.config)
    }
}
