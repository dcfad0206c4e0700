//! Buffered allocator configuration.

use serde::Deserialize;

/// Cached bytes allowed before a forced flush when no threshold is set (1 GiB).
pub const DEFAULT_THRESHOLD: usize = 1 << 30;

/// Configuration for a [`BufferedAllocator`](super::BufferedAllocator).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BufferedConfig {
    /// Maximum bytes held in the reuse cache before the next allocation
    /// flushes it. Negative means unset, which selects [`DEFAULT_THRESHOLD`].
    pub threshold: i64,
}

impl Default for BufferedConfig {
    fn default() -> Self {
        Self { threshold: -1 }
    }
}

impl BufferedConfig {
    /// Sets the cache threshold in bytes. Negative values select the default.
    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the threshold that will actually be enforced.
    pub fn effective_threshold(&self) -> usize {
        if self.threshold >= 0 {
            usize::try_from(self.threshold).unwrap_or(usize::MAX)
        } else {
            DEFAULT_THRESHOLD
        }
    }
}
