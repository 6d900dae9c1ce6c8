use std::collections::HashSet;

use zk_primitives::Element;

/// Every root the commitment tree has ever had
///
/// Roots are never evicted: a proof built against an old root is still accepted after unrelated
/// insertions have moved the tree on, since the old root was once a valid snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootHistory {
    roots: HashSet<Element>,
}

impl RootHistory {
    /// An empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `root` as valid, returning `true` if it wasn't already known
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// let mut history = RootHistory::new();
    ///
    /// assert!(history.record(Element::ONE));
    /// assert!(!history.record(Element::ONE));
    /// assert!(history.is_known(Element::ONE));
    /// assert_eq!(history.len(), 1);
    /// ```
    pub fn record(&mut self, root: Element) -> bool {
        self.roots.insert(root)
    }

    /// Whether `root` was ever recorded
    #[inline]
    #[must_use]
    pub fn is_known(&self, root: Element) -> bool {
        self.roots.contains(&root)
    }

    /// The number of distinct roots
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether no root was ever recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every recorded root, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.roots.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, prelude::any};
    use test_strategy::proptest;

    use super::*;

    #[proptest]
    fn recording_twice_is_idempotent(#[strategy(vec(any::<Element>(), 1..20))] roots: Vec<Element>) {
        let mut once = RootHistory::new();
        let mut twice = RootHistory::new();

        for root in &roots {
            once.record(*root);
            twice.record(*root);
            twice.record(*root);
        }

        assert_eq!(once, twice);
        for root in &roots {
            assert!(twice.is_known(*root));
        }
    }

    #[test]
    fn old_roots_stay_valid() {
        let mut history = RootHistory::new();

        for i in 0..100 {
            history.record(Element::new(i));
        }

        assert!(history.is_known(Element::new(0)));
        assert!(!history.is_known(Element::new(100)));
    }

    #[test]
    fn seeing_an_old_root_again_changes_nothing() {
        let mut history = RootHistory::new();
        history.record(Element::new(1));
        history.record(Element::new(2));
        let before = history.clone();

        assert!(!history.record(Element::new(1)));
        assert_eq!(history, before);
    }
}
