//! Size-ordered multi-map of cached allocations.

use std::collections::BTreeMap;

use membuf_common::types::Allocation;

/// Freed allocations grouped by exact size, ascending.
///
/// Each bucket is a stack: the most recently cached block of a size is the
/// first one handed back out.
#[derive(Debug, Default)]
pub(crate) struct BucketCache {
    /// Size in bytes -> cached allocations of that size.
    buckets: BTreeMap<usize, Vec<Allocation>>,
    /// Number of cached allocations across all buckets.
    blocks: usize,
}

impl BucketCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of cached allocations.
    pub(crate) fn len(&self) -> usize {
        self.blocks
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.blocks == 0
    }

    pub(crate) fn insert(&mut self, allocation: Allocation) {
        self.buckets
            .entry(allocation.size())
            .or_default()
            .push(allocation);
        self.blocks += 1;
    }

    /// Removes the smallest cached allocation of at least `size` bytes.
    pub(crate) fn take_at_least(&mut self, size: usize) -> Option<Allocation> {
        let (&key, bucket) = self.buckets.range_mut(size..).next()?;
        let allocation = bucket.pop()?;
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        self.blocks -= 1;
        Some(allocation)
    }

    /// Removes one of the largest cached allocations.
    pub(crate) fn pop_largest(&mut self) -> Option<Allocation> {
        let mut entry = self.buckets.last_entry()?;
        let allocation = entry.get_mut().pop()?;
        if entry.get().is_empty() {
            entry.remove();
        }
        self.blocks -= 1;
        Some(allocation)
    }
}
