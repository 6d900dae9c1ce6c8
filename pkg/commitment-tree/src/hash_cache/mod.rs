use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use zk_primitives::{hash_merge, Element};

pub use self::metrics::CacheMetrics;

mod metrics;

/// A known result of [`hash_merge([left, right])`][hash_merge]
///
/// Storage persists these so a reopened tree can be rebuilt without rerunning Poseidon for every
/// parent node.
///
/// [hash_merge]: zk_primitives::hash_merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KnownHash {
    /// The left child
    pub left: Element,
    /// The right child
    pub right: Element,
    /// `hash_merge([left, right])`
    pub result: Element,
}

/// Types which can speed up parent hash computations
///
/// The result of [`HashCache::hash`] must *always* equal [`hash_merge`]. An implementation that
/// disagrees makes the [`Tree`] publish roots that no proof can ever match.
///
/// [`Tree`]: crate::Tree
pub trait HashCache: Sync + 'static {
    /// Compute [`hash_merge([left, right])`][hash_merge]
    fn hash(&self, left: Element, right: Element) -> Element {
        hash_merge([left, right])
    }
}

/// No caching, the default for [`Tree`]
///
/// [`Tree`]: crate::Tree
#[derive(Debug, Clone, Default)]
pub struct NoopHashCache;

impl HashCache for NoopHashCache {}

/// A shared, thread-safe table of parent hashes
///
/// Clones share the same table and metrics.
#[derive(Debug, Clone, Default)]
pub struct SimpleHashCache {
    inner: Arc<DashMap<(Element, Element), Element>>,
    metrics: CacheMetrics,
}

impl HashCache for SimpleHashCache {
    #[inline]
    fn hash(&self, left: Element, right: Element) -> Element {
        match self.inner.entry((left, right)) {
            Entry::Occupied(entry) => {
                self.metrics.record(true);
                *entry.get()
            }
            Entry::Vacant(entry) => {
                self.metrics.record(false);
                *entry.insert(hash_merge([left, right]))
            }
        }
    }
}

impl SimpleHashCache {
    /// Create a new, empty [`SimpleHashCache`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of cached hashes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing has been cached yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Seed the cache with hashes computed elsewhere
    ///
    /// These are trusted as-is. Only feed it hashes that were produced by a [`HashCache`].
    pub fn provide_known_hashes(&self, hashes: impl IntoIterator<Item = KnownHash>) {
        for KnownHash {
            left,
            right,
            result,
        } in hashes
        {
            self.inner.insert((left, right), result);
        }
    }

    /// Drop every cached hash
    #[inline]
    pub fn evict_all(&self) {
        self.inner.clear();
    }

    /// Usage counters for this cache
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pairs_hit_the_cache() {
        let cache = SimpleHashCache::new();
        let (a, b) = (Element::new(1), Element::new(2));

        let first = cache.hash(a, b);
        let second = cache.hash(a, b);
        let swapped = cache.hash(b, a);

        assert_eq!(first, hash_merge([a, b]));
        assert_eq!(first, second);
        assert_ne!(first, swapped);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.metrics().hashes(), 3);
        assert_eq!(cache.metrics().cache_hits(), 1);
        assert_eq!(cache.metrics().cache_misses(), 2);
    }

    #[test]
    fn provided_hashes_are_served() {
        let cache = SimpleHashCache::new();
        let (left, right) = (Element::new(7), Element::new(8));
        let result = hash_merge([left, right]);

        cache.provide_known_hashes([KnownHash {
            left,
            right,
            result,
        }]);

        assert_eq!(cache.hash(left, right), result);
        assert_eq!(cache.metrics().cache_hits(), 1);

        cache.evict_all();
        assert!(cache.is_empty());
    }
}
