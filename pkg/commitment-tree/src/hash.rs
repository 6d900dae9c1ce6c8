use zk_primitives::{hash_merge, Element};

/// The root of every all-empty subtree, indexed by height
///
/// The result has `depth + 1` entries:
///  - `hashes[0] = empty_leaf`
///  - `hashes[h] = hash_merge([hashes[h - 1], hashes[h - 1]])`
///
/// so `hashes[depth]` is the root of a freshly initialized tree.
///
/// ```rust
/// # use commitment_tree::*;
/// let empty_leaf = Element::new(5_769_240);
/// let hashes = empty_subtree_hashes(empty_leaf, 5);
///
/// assert_eq!(hashes.len(), 6);
/// assert_eq!(hashes[0], empty_leaf);
/// assert_eq!(hashes[5], Tree::<5>::new(empty_leaf).root_hash());
/// ```
#[must_use]
pub fn empty_subtree_hashes(empty_leaf: Element, depth: usize) -> Vec<Element> {
    let mut hashes = Vec::with_capacity(depth + 1);
    let mut hash = empty_leaf;
    hashes.push(hash);

    for _ in 0..depth {
        hash = hash_merge([hash, hash]);
        hashes.push(hash);
    }

    hashes
}

/// Compute a Merkle root from the full, ordered list of leaves
///
/// This hashes every internal node, so it is only useful to cross-check the incremental root
/// kept by a [`Tree`].
///
/// # Panics
///
/// Panics if the number of leaves is not a power of two.
///
/// [`Tree`]: crate::Tree
#[must_use]
pub fn root_of_leaves(leaves: &[Element]) -> Element {
    assert!(
        leaves.len().is_power_of_two(),
        "a full tree has a power of two leaves, got {}",
        leaves.len()
    );

    let mut layer = leaves.to_vec();

    while layer.len() > 1 {
        layer = layer
            .chunks_exact(2)
            .map(|pair| hash_merge([pair[0], pair[1]]))
            .collect();
    }

    layer[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_leaf_tree() {
        assert_eq!(root_of_leaves(&[Element::new(9)]), Element::new(9));
        assert_eq!(empty_subtree_hashes(Element::new(9), 0), vec![Element::new(9)]);
    }

    #[test]
    fn empty_hashes_match_from_scratch() {
        let empty_leaf = Element::new(3);
        let hashes = empty_subtree_hashes(empty_leaf, 4);

        for (height, hash) in hashes.iter().enumerate() {
            let leaves = vec![empty_leaf; 1 << height];
            assert_eq!(root_of_leaves(&leaves), *hash);
        }
    }

    #[test]
    #[should_panic = "power of two"]
    fn ragged_leaves_panic() {
        let _ = root_of_leaves(&[Element::ONE; 3]);
    }
}
