use zk_primitives::Element;

use crate::hash_cache::{HashCache, KnownHash};

/// A tree-like representation of the leaf slots, for computing paths and hashes
///
/// Untouched regions stay collapsed as [`Node::Empty`], so memory grows with the number of written
/// leaves rather than with the capacity.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// A written leaf slot
    Leaf(Element),

    /// A subtree of the given height where every leaf is the empty sentinel
    ///
    /// Its hash is looked up in the table of empty subtree hashes
    Empty { height: usize },

    /// A parent of two nodes with a cached hash
    Parent {
        left: Box<Self>,
        right: Box<Self>,
        hash: Element,
        /// if true, a descendant changed since `hash` was computed
        hash_dirty: bool,
    },
}

impl Node {
    pub fn hash(&self, empty_hashes: &[Element]) -> Element {
        match self {
            Self::Leaf(hash) | Self::Parent { hash, .. } => *hash,
            Self::Empty { height } => empty_hashes[*height],
        }
    }

    /// Write `value` into the slot at `index`, without updating hashes
    ///
    /// `height` is the height of `self`. Every parent on the way down is marked dirty.
    pub fn set_without_hashing(&mut self, height: usize, index: u64, value: Element) {
        match self {
            Self::Leaf(leaf) => *leaf = value,
            Self::Empty { height: 0 } => *self = Self::Leaf(value),
            Self::Empty { .. } => {
                let child = Self::Empty { height: height - 1 };

                *self = Self::Parent {
                    left: Box::new(child.clone()),
                    right: Box::new(child),
                    // overwritten by the next `recalculate_hashes`
                    hash: Element::ZERO,
                    hash_dirty: true,
                };

                self.set_without_hashing(height, index, value);
            }
            Self::Parent {
                left,
                right,
                hash_dirty,
                ..
            } => {
                let child_height = height - 1;

                match (index >> child_height) & 1 {
                    0 => left.set_without_hashing(child_height, index, value),
                    _ => right.set_without_hashing(child_height, index, value),
                }

                *hash_dirty = true;
            }
        }
    }

    /// The value in the slot at `index`, or `None` if it was never written
    pub fn get(&self, height: usize, index: u64) -> Option<Element> {
        match self {
            Self::Leaf(leaf) => Some(*leaf),
            Self::Empty { .. } => None,
            Self::Parent { left, right, .. } => {
                let child_height = height - 1;

                match (index >> child_height) & 1 {
                    0 => left.get(child_height, index),
                    _ => right.get(child_height, index),
                }
            }
        }
    }

    /// Rehash every dirty parent, siblings in parallel
    pub fn recalculate_hashes<C: HashCache>(&mut self, cache: &C, empty_hashes: &[Element]) {
        let Self::Parent {
            left,
            right,
            hash,
            hash_dirty,
        } = self
        else {
            return;
        };

        if !*hash_dirty {
            return;
        }

        rayon::join(
            || left.recalculate_hashes(cache, empty_hashes),
            || right.recalculate_hashes(cache, empty_hashes),
        );

        *hash = cache.hash(left.hash(empty_hashes), right.hash(empty_hashes));
        *hash_dirty = false;
    }

    /// Every parent hash this node has materialized, parents before children
    pub fn known_hashes(&self, empty_hashes: &[Element], hashes: &mut Vec<KnownHash>) {
        if let Self::Parent {
            left,
            right,
            hash,
            hash_dirty,
        } = self
        {
            debug_assert!(!hash_dirty, "hashes are recalculated after every write");

            hashes.push(KnownHash {
                left: left.hash(empty_hashes),
                right: right.hash(empty_hashes),
                result: *hash,
            });

            left.known_hashes(empty_hashes, hashes);
            right.known_hashes(empty_hashes, hashes);
        }
    }
}
