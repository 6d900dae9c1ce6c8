use std::sync::Arc;

use zk_primitives::Element;

use crate::{
    hash::empty_subtree_hashes,
    hash_cache::{HashCache, KnownHash, NoopHashCache},
};

mod insert;
mod path;
mod tree_repr;

pub use path::{Direction, Path, PathStep};

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

/// A fixed-depth, index-addressed Merkle tree of commitments
///
/// A `Tree<DEPTH>` has `2^DEPTH` leaf slots and produces [`Path`]s with exactly `DEPTH` siblings.
///
/// ```rust
/// # use commitment_tree::*;
/// let empty_leaf = Element::new(5_769_240);
/// let mut tree = Tree::<5>::new(empty_leaf);
/// let initial_root = tree.root_hash();
///
/// tree.update_leaf(0, Element::new(1)).unwrap();
/// assert_ne!(tree.root_hash(), initial_root);
///
/// // writing the sentinel back restores the initial root
/// tree.update_leaf(0, empty_leaf).unwrap();
/// assert_eq!(tree.root_hash(), initial_root);
/// ```
#[derive(Debug, Clone)]
pub struct Tree<const DEPTH: usize, C = NoopHashCache> {
    tree: tree_repr::Node,
    /// `empty_hashes[h]` is the hash of an all-empty subtree of height `h`
    empty_hashes: Arc<[Element]>,
    /// The lowest slot `append` may write to
    next_index: u64,
    cache: C,
}

impl<const DEPTH: usize, C> PartialEq for Tree<DEPTH, C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.root_hash() == other.root_hash()
    }
}

impl<const DEPTH: usize, C> Eq for Tree<DEPTH, C> {}

impl<const DEPTH: usize, C> Tree<DEPTH, C> {
    const DEPTH_FITS_INDEX: () = assert!(DEPTH < 64, "leaf indices are u64");

    /// The number of leaf slots, `2^DEPTH`
    pub const CAPACITY: u64 = 1 << DEPTH;

    /// Create a tree where every slot holds `empty_leaf`
    #[must_use]
    pub fn new(empty_leaf: Element) -> Self
    where
        C: Default,
    {
        Self::new_with_cache(empty_leaf, C::default())
    }

    /// Create a tree where every slot holds `empty_leaf`, hashing through `cache`
    #[must_use]
    pub fn new_with_cache(empty_leaf: Element, cache: C) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::DEPTH_FITS_INDEX;

        Self {
            tree: tree_repr::Node::Empty { height: DEPTH },
            empty_hashes: empty_subtree_hashes(empty_leaf, DEPTH).into(),
            next_index: 0,
            cache,
        }
    }

    /// The sentinel every unwritten slot holds
    #[inline]
    #[must_use]
    pub fn empty_leaf(&self) -> Element {
        self.empty_hashes[0]
    }

    /// The number of leaf slots, `2^DEPTH`
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u64 {
        Self::CAPACITY
    }

    /// The slot the next [`Tree::append`] writes to
    ///
    /// Equal to [`Tree::capacity`] once the tree is full
    #[inline]
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Whether every slot has been allocated
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.next_index == Self::CAPACITY
    }

    /// The number of slots [`Tree::append`] can still fill
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> u64 {
        Self::CAPACITY - self.next_index
    }

    /// The root hash
    ///
    /// This is cached, so calls are essentially free
    #[inline]
    #[must_use]
    pub fn root_hash(&self) -> Element {
        self.tree.hash(&self.empty_hashes)
    }

    /// The value in slot `index`, or `None` if `index` is out of range
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<2>::new(Element::ZERO);
    /// tree.append(Element::new(7)).unwrap();
    ///
    /// assert_eq!(tree.leaf(0), Some(Element::new(7)));
    /// assert_eq!(tree.leaf(1), Some(Element::ZERO));
    /// assert_eq!(tree.leaf(4), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn leaf(&self, index: u64) -> Option<Element> {
        (index < Self::CAPACITY)
            .then(|| self.tree.get(DEPTH, index).unwrap_or(self.empty_leaf()))
    }

    /// Every leaf slot in index order, `2^DEPTH` values
    pub fn leaves(&self) -> impl Iterator<Item = Element> + '_ {
        (0..Self::CAPACITY).map(|index| self.tree.get(DEPTH, index).unwrap_or(self.empty_leaf()))
    }

    /// The hash cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Every parent hash currently materialized in the tree
    ///
    /// Feeding these to [`SimpleHashCache::provide_known_hashes`] lets an identical tree be rebuilt
    /// without hashing
    ///
    /// [`SimpleHashCache::provide_known_hashes`]: crate::hash_cache::SimpleHashCache::provide_known_hashes
    #[must_use]
    pub fn known_hashes(&self) -> Vec<KnownHash> {
        let mut hashes = Vec::new();
        self.tree.known_hashes(&self.empty_hashes, &mut hashes);
        hashes
    }

    fn recalculate_hashes(&mut self)
    where
        C: HashCache,
    {
        self.tree
            .recalculate_hashes(&self.cache, &self.empty_hashes);
    }
}

#[cfg(test)]
mod tests {
    use zk_primitives::hash_merge;

    use crate::{hash_cache::SimpleHashCache, root_of_leaves};

    use super::*;

    #[test]
    fn initial_root_is_the_empty_subtree_hash() {
        let empty_leaf = hash_merge([Element::new(5_769_240)]);
        let tree = Tree::<5>::new(empty_leaf);

        let expected = root_of_leaves(&[empty_leaf; 32]);

        assert_eq!(tree.root_hash(), expected);
        assert_eq!(tree.root_hash(), Tree::<5>::new(empty_leaf).root_hash());
        assert_ne!(tree.root_hash(), Tree::<5>::new(Element::ZERO).root_hash());
    }

    #[test]
    fn depth_zero_tree_is_a_single_slot() {
        let mut tree = Tree::<0>::new(Element::ZERO);
        assert_eq!(tree.capacity(), 1);

        tree.append(Element::new(4)).unwrap();

        assert_eq!(tree.root_hash(), Element::new(4));
        assert!(tree.is_full());
    }

    #[test]
    fn known_hashes_rebuild_without_hashing() {
        let mut tree = Tree::<4>::new(Element::ZERO);
        tree.append_all([1, 2, 3, 9].map(Element::new)).unwrap();

        let cache = SimpleHashCache::new();
        cache.provide_known_hashes(tree.known_hashes());

        let mut rebuilt = Tree::<4, _>::new_with_cache(Element::ZERO, cache);
        rebuilt.append_all([1, 2, 3, 9].map(Element::new)).unwrap();

        assert_eq!(rebuilt.root_hash(), tree.root_hash());
        assert_eq!(rebuilt.cache().metrics().cache_misses(), 0);
    }

    #[test]
    fn leaves_lists_every_slot() {
        let mut tree = Tree::<3>::new(Element::ZERO);
        tree.update_leaf(5, Element::new(5)).unwrap();

        let leaves: Vec<_> = tree.leaves().collect();

        assert_eq!(leaves.len(), 8);
        assert_eq!(leaves[5], Element::new(5));
        assert_eq!(root_of_leaves(&leaves), tree.root_hash());
    }
}
