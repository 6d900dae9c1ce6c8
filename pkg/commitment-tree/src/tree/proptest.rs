use ::proptest::{
    arbitrary::StrategyFor, collection::vec, prelude::*, strategy::Map,
};
use zk_primitives::Element;

use crate::{
    hash_cache::{HashCache, NoopHashCache, SimpleHashCache},
    Tree,
};

type Parts<C> = (C, Element, Vec<Element>);

/// A tree with a random sentinel and up to `2^DEPTH` appended leaves
impl<const DEPTH: usize, C> Arbitrary for Tree<DEPTH, C>
where
    C: HashCache + Arbitrary,
{
    type Parameters = ();
    type Strategy = Map<BoxedStrategy<Parts<C>>, fn(Parts<C>) -> Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        let capacity = 1usize << DEPTH;

        (any::<C>(), any::<Element>(), vec(any::<Element>(), 0..=capacity))
            .boxed()
            .prop_map(|(cache, empty_leaf, leaves)| {
                let mut tree = Tree::new_with_cache(empty_leaf, cache);
                tree.append_all(leaves).unwrap();
                tree
            })
    }
}

impl Arbitrary for NoopHashCache {
    type Parameters = ();
    type Strategy = Just<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        Just(Self)
    }
}

impl Arbitrary for SimpleHashCache {
    type Parameters = ();
    type Strategy = Map<StrategyFor<()>, fn(()) -> Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        any::<()>().prop_map(|()| Self::new())
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use crate::root_of_leaves;

    use super::*;

    #[proptest]
    fn arbitrary_trees_are_consistent(tree: Tree<4, SimpleHashCache>) {
        let leaves: Vec<_> = tree.leaves().collect();

        assert_eq!(tree.root_hash(), root_of_leaves(&leaves));
        assert!(tree.next_index() <= tree.capacity());
    }
}
