use std::collections::HashSet;

use zk_primitives::Element;

/// The nullifiers of every spent note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullifierSet(HashSet<Element>);

impl NullifierSet {
    /// An empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `nullifier` has been spent
    #[inline]
    #[must_use]
    pub fn contains(&self, nullifier: Element) -> bool {
        self.0.contains(&nullifier)
    }

    /// Mark `nullifier` as spent, returning `false` if it already was
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// let mut spent = NullifierSet::new();
    ///
    /// assert!(spent.insert(Element::new(7)));
    /// assert!(!spent.insert(Element::new(7)));
    /// ```
    pub fn insert(&mut self, nullifier: Element) -> bool {
        self.0.insert(nullifier)
    }

    /// The number of spent notes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been spent
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every spent nullifier, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = Element> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Element> for NullifierSet {
    fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
