use std::ops::Range;

use zk_primitives::Element;

use crate::{hash_cache::HashCache, Error, Tree};

impl<const DEPTH: usize, C: HashCache> Tree<DEPTH, C> {
    /// Overwrite the slot at `index` and recompute the `DEPTH` hashes above it
    ///
    /// The insertion counter is moved past `index`, so a later [`Tree::append`] never writes to
    /// this slot again.
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<5>::new(Element::ZERO);
    ///
    /// tree.update_leaf(3, Element::new(1)).unwrap();
    /// assert_eq!(tree.next_index(), 4);
    ///
    /// let error = tree.update_leaf(32, Element::new(1)).unwrap_err();
    /// assert_eq!(error, Error::IndexOutOfRange { index: 32, capacity: 32 });
    /// ```
    pub fn update_leaf(&mut self, index: u64, value: Element) -> Result<(), Error> {
        self.check_index(index)?;

        self.tree.set_without_hashing(DEPTH, index, value);
        self.next_index = self.next_index.max(index + 1);
        self.recalculate_hashes();

        tracing::trace!(index, %value, root = %self.root_hash(), "updated leaf");

        Ok(())
    }

    /// Write `value` to the next unallocated slot, returning its index
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<1>::new(Element::ZERO);
    ///
    /// assert_eq!(tree.append(Element::new(1)), Ok(0));
    /// assert_eq!(tree.append(Element::new(2)), Ok(1));
    /// assert_eq!(tree.append(Element::new(3)), Err(Error::TreeFull { capacity: 2 }));
    /// ```
    pub fn append(&mut self, value: Element) -> Result<u64, Error> {
        let range = self.append_all([value])?;
        Ok(range.start)
    }

    /// Write `values` to consecutive unallocated slots, hashing once at the end
    ///
    /// Either every value is written or, if there isn't room for all of them, none are.
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<2>::new(Element::ZERO);
    /// tree.append(Element::new(1)).unwrap();
    ///
    /// let range = tree.append_all([2, 3].map(Element::new)).unwrap();
    /// assert_eq!(range, 1..3);
    ///
    /// let before = tree.root_hash();
    /// let error = tree.append_all([4, 5].map(Element::new)).unwrap_err();
    /// assert_eq!(error, Error::TreeFull { capacity: 4 });
    /// assert_eq!(tree.root_hash(), before);
    /// ```
    pub fn append_all<I>(&mut self, values: I) -> Result<Range<u64>, Error>
    where
        I: IntoIterator<Item = Element>,
        I::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let count = values.len() as u64;

        if count > self.remaining() {
            return Err(Error::TreeFull {
                capacity: Self::CAPACITY,
            });
        }

        let start = self.next_index;

        for (index, value) in (start..).zip(values) {
            self.tree.set_without_hashing(DEPTH, index, value);
        }

        self.next_index = start + count;
        self.recalculate_hashes();

        tracing::trace!(start, count, root = %self.root_hash(), "appended leaves");

        Ok(start..self.next_index)
    }

    /// Rebuild a tree from previously written slots
    ///
    /// `next_index` is the insertion counter of the tree being restored. It may be larger than
    /// any written index, since appended leaves can hold the sentinel value.
    pub fn restore<I>(
        empty_leaf: Element,
        cache: C,
        leaves: I,
        next_index: u64,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u64, Element)>,
    {
        if next_index > Self::CAPACITY {
            return Err(Error::IndexOutOfRange {
                index: next_index,
                capacity: Self::CAPACITY,
            });
        }

        let mut tree = Self::new_with_cache(empty_leaf, cache);

        for (index, value) in leaves {
            tree.check_index(index)?;
            tree.tree.set_without_hashing(DEPTH, index, value);
            tree.next_index = tree.next_index.max(index + 1);
        }

        tree.next_index = tree.next_index.max(next_index);
        tree.recalculate_hashes();

        Ok(tree)
    }

    fn check_index(&self, index: u64) -> Result<(), Error> {
        match index < Self::CAPACITY {
            true => Ok(()),
            false => Err(Error::IndexOutOfRange {
                index,
                capacity: Self::CAPACITY,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec, prelude::any};
    use test_strategy::proptest;

    use crate::{hash_cache::SimpleHashCache, root_of_leaves};

    use super::*;

    #[proptest]
    fn incremental_root_matches_from_scratch(
        #[strategy(vec((0u64..32, any::<Element>()), 0..24))] writes: Vec<(u64, Element)>,
    ) {
        let empty_leaf = Element::new(5_769_240);
        let mut tree = Tree::<5>::new(empty_leaf);
        let mut leaves = vec![empty_leaf; 32];

        for (index, value) in writes {
            tree.update_leaf(index, value).unwrap();
            leaves[index as usize] = value;

            assert_eq!(tree.root_hash(), root_of_leaves(&leaves));
        }

        assert_eq!(tree.leaves().collect::<Vec<_>>(), leaves);
    }

    #[proptest]
    fn append_all_matches_appending_one_by_one(
        #[strategy(vec(any::<Element>(), 0..16))] values: Vec<Element>,
    ) {
        let mut batched = Tree::<4>::new(Element::ZERO);
        let mut single = Tree::<4>::new(Element::ZERO);

        batched.append_all(values.iter().copied()).unwrap();
        for value in &values {
            single.append(*value).unwrap();
        }

        assert_eq!(batched.root_hash(), single.root_hash());
        assert_eq!(batched.next_index(), values.len() as u64);
    }

    #[test]
    fn update_rehashes_exactly_one_path() {
        let mut tree = Tree::<5, _>::new_with_cache(Element::ZERO, SimpleHashCache::new());
        tree.update_leaf(0, Element::new(1)).unwrap();

        let before = tree.cache().metrics().hashes();
        tree.update_leaf(17, Element::new(2)).unwrap();

        assert_eq!(tree.cache().metrics().hashes() - before, 5);
    }

    #[test]
    fn append_never_clobbers_explicit_writes() {
        let mut tree = Tree::<3>::new(Element::ZERO);

        tree.update_leaf(2, Element::new(10)).unwrap();
        let index = tree.append(Element::new(11)).unwrap();

        assert_eq!(index, 3);
        assert_eq!(tree.leaf(2), Some(Element::new(10)));
    }

    #[test]
    fn lower_explicit_write_keeps_counter() {
        let mut tree = Tree::<3>::new(Element::ZERO);

        tree.update_leaf(6, Element::new(1)).unwrap();
        tree.update_leaf(1, Element::new(2)).unwrap();

        assert_eq!(tree.next_index(), 7);
    }

    #[test]
    fn full_tree_rejects_appends() {
        let mut tree = Tree::<2>::new(Element::ZERO);
        tree.append_all([1, 2, 3, 4].map(Element::new)).unwrap();

        assert!(tree.is_full());
        assert_eq!(
            tree.append(Element::new(5)),
            Err(Error::TreeFull { capacity: 4 })
        );

        // explicit writes still work on a full tree
        tree.update_leaf(0, Element::new(6)).unwrap();
        assert_eq!(tree.leaf(0), Some(Element::new(6)));
    }

    #[test]
    fn restore_round_trips() {
        let mut tree = Tree::<4>::new(Element::ONE);
        tree.append_all([5, 6, 7].map(Element::new)).unwrap();
        tree.update_leaf(12, Element::new(8)).unwrap();

        let written = (0..tree.next_index()).filter_map(|i| Some((i, tree.leaf(i)?)));
        let restored =
            Tree::<4>::restore(Element::ONE, Default::default(), written, tree.next_index())
                .unwrap();

        assert_eq!(restored.root_hash(), tree.root_hash());
        assert_eq!(restored.next_index(), 13);
    }

    #[test]
    fn restore_rejects_bad_indices() {
        let result = Tree::<2>::restore(Element::ONE, Default::default(), [(4, Element::ONE)], 0);
        assert_eq!(
            result.unwrap_err(),
            Error::IndexOutOfRange {
                index: 4,
                capacity: 4
            }
        );
    }
}
