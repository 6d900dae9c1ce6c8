use crate::{hash_merge, Element};

/// Replay a Merkle path from a leaf up to the root
///
/// `siblings` yields `(sibling, sibling_is_left)` pairs, deepest first. When `sibling_is_left` is
/// `false` the running hash is the left child (`hash_merge([node, sibling])`), otherwise it is
/// the right child (`hash_merge([sibling, node])`).
///
/// Proving that `2` is the third leaf of a four-leaf tree:
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(0), Element::new(1)]);
/// let b = hash_merge([Element::new(2), Element::new(3)]);
/// let root = hash_merge([a, b]);
///
/// // leaf index 2 is 0b10: left child at the bottom, right child above it
/// let siblings = [(Element::new(3), false), (a, true)];
///
/// assert_eq!(compute_merkle_root(Element::new(2), siblings), root);
/// assert_ne!(compute_merkle_root(Element::new(3), siblings), root);
/// ```
pub fn compute_merkle_root<I: IntoIterator<Item = (Element, bool)>>(
    leaf: Element,
    siblings: I,
) -> Element {
    siblings
        .into_iter()
        .fold(leaf, |node, (sibling, sibling_is_left)| match sibling_is_left {
            false => hash_merge([node, sibling]),
            true => hash_merge([sibling, node]),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_the_leaf() {
        let leaf = Element::new(42);
        assert_eq!(compute_merkle_root(leaf, []), leaf);
    }

    #[test]
    fn direction_changes_the_root() {
        let leaf = Element::new(1);
        let sibling = Element::new(2);

        let as_left = compute_merkle_root(leaf, [(sibling, false)]);
        let as_right = compute_merkle_root(leaf, [(sibling, true)]);

        assert_eq!(as_left, hash_merge([leaf, sibling]));
        assert_eq!(as_right, hash_merge([sibling, leaf]));
        assert_ne!(as_left, as_right);
    }
}
