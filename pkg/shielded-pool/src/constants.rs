use zk_primitives::{hash_merge, Element};

/// The depth of the pool's commitment tree, giving 32 leaf slots
pub const TREE_DEPTH: usize = 5;

/// The public seed of the empty note that fills every unwritten leaf
pub const EMPTY_NOTE_SEED: Element = Element::new(0x0058_0818);

/// The asset id used for bitcoin-denominated notes
pub const BTC_ASSET_ID: Element = Element::new(0x006a_296c);

/// The owner tag of payout notes
///
/// Nobody knows a secret hashing to this value, so a payout note can never be spent again once the
/// value it represents has left the pool
pub const BURN_OWNER: Element = Element::new(0xdead);

/// The leaf value of an empty slot, `hash_merge([EMPTY_NOTE_SEED])`
#[must_use]
pub fn empty_leaf() -> Element {
    empty_leaf_for_seed(EMPTY_NOTE_SEED)
}

/// The leaf value of an empty slot for a custom seed
#[must_use]
pub fn empty_leaf_for_seed(seed: Element) -> Element {
    hash_merge([seed])
}

#[cfg(test)]
mod tests {
    use commitment_tree::Tree;

    use super::*;

    #[test]
    fn seeds_match_their_decimal_values() {
        assert_eq!(EMPTY_NOTE_SEED, Element::new(5_769_240));
        assert_eq!(BTC_ASSET_ID, Element::new(6_957_420));
    }

    #[test]
    fn initial_root_is_fixed() {
        let a = Tree::<TREE_DEPTH>::new(empty_leaf());
        let b = Tree::<TREE_DEPTH>::new(empty_leaf());

        assert_eq!(a.root_hash(), b.root_hash());
        assert_ne!(a.root_hash(), Tree::<TREE_DEPTH>::new(EMPTY_NOTE_SEED).root_hash());
    }
}
