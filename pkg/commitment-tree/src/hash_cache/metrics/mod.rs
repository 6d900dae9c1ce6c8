use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counters describing how a [`SimpleHashCache`] has been used
///
/// Clones share the same counters.
///
/// [`SimpleHashCache`]: crate::hash_cache::SimpleHashCache
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hashes: Arc<AtomicUsize>,
    cache_hits: Arc<AtomicUsize>,
}

impl CacheMetrics {
    /// The number of parent hashes requested from the cache
    #[inline]
    #[must_use]
    pub fn hashes(&self) -> usize {
        self.hashes.load(Ordering::Relaxed)
    }

    /// The number of requests answered without hashing
    #[inline]
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// The number of requests that had to run Poseidon
    #[inline]
    #[must_use]
    pub fn cache_misses(&self) -> usize {
        self.hashes() - self.cache_hits()
    }

    pub(crate) fn record(&self, hit: bool) {
        self.hashes.fetch_add(1, Ordering::Relaxed);

        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}
