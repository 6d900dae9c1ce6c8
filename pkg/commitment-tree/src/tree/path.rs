use zk_primitives::Element;

use crate::{Error, Tree};

use super::tree_repr::Node;

/// Which side of the running hash a sibling sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// The sibling is the left child, so the parent is `hash_merge([sibling, node])`
    Left,
    /// The sibling is the right child, so the parent is `hash_merge([node, sibling])`
    Right,
}

impl Direction {
    /// The circuit encoding of a direction, `1` for a right sibling and `0` for a left sibling
    #[inline]
    #[must_use]
    pub fn to_bit(self) -> Element {
        Element::from(self == Self::Right)
    }
}

/// One level of a [`Path`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    /// Where the sibling sits
    pub direction: Direction,
    /// The sibling's hash
    pub sibling: Element,
}

/// A Merkle path from one leaf slot of a [`Tree`] to its root
///
/// A `Path<DEPTH>` has exactly `DEPTH` siblings, deepest first. The direction at each level comes
/// from the bits of the leaf index, least significant first: a `1` bit means the running hash is
/// a right child, so its sibling is on the [`Direction::Left`].
///
/// ```rust
/// # use commitment_tree::*;
/// let mut tree = Tree::<5>::new(Element::ZERO);
/// let index = tree.append(Element::new(42)).unwrap();
///
/// let path = tree.path_for(index).unwrap();
///
/// // the path remembers the root it was created against
/// assert_eq!(path.actual_root_hash(), tree.root_hash());
/// assert!(path.proves(Element::new(42)));
/// assert!(!path.proves(Element::new(43)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path<const DEPTH: usize> {
    /// The siblings of the leaf, deepest first
    pub siblings: [Element; DEPTH],
    /// The leaf slot this path starts from
    pub index: u64,
    pub(crate) root_hash: Element,
}

impl<const DEPTH: usize> Path<DEPTH> {
    /// Reassemble a path received from elsewhere, e.g. a witness built by another client
    ///
    /// Nothing is checked until [`Path::proves`] is called.
    #[inline]
    #[must_use]
    pub fn from_parts(siblings: [Element; DEPTH], index: u64, root_hash: Element) -> Self {
        Self {
            siblings,
            index,
            root_hash,
        }
    }

    /// The direction and sibling at every level, deepest first
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<3>::new(Element::ZERO);
    /// tree.update_leaf(0b110, Element::ONE).unwrap();
    ///
    /// let path = tree.path_for(0b110).unwrap();
    /// let directions: Vec<_> = path.steps().map(|step| step.direction).collect();
    ///
    /// assert_eq!(directions, [Direction::Right, Direction::Left, Direction::Left]);
    /// ```
    pub fn steps(&self) -> impl Iterator<Item = PathStep> + '_ {
        self.siblings
            .iter()
            .enumerate()
            .map(|(level, &sibling)| PathStep {
                direction: match (self.index >> level) & 1 {
                    0 => Direction::Right,
                    _ => Direction::Left,
                },
                sibling,
            })
    }

    /// Whether this path shows `leaf` sits at [`Path::index`] under [`Path::actual_root_hash`]
    #[inline]
    #[must_use]
    pub fn proves(&self, leaf: Element) -> bool {
        self.compute_root_hash(leaf) == self.actual_root_hash()
    }

    /// The root this path would lead to if its slot held `leaf`
    ///
    /// Internally, this calls [`zk_primitives::compute_merkle_root`]
    #[must_use]
    pub fn compute_root_hash(&self, leaf: Element) -> Element {
        let siblings = self
            .steps()
            .map(|step| (step.sibling, step.direction == Direction::Left));

        zk_primitives::compute_merkle_root(leaf, siblings)
    }

    /// The root hash of the tree when this path was created
    #[inline]
    #[must_use]
    pub fn actual_root_hash(&self) -> Element {
        self.root_hash
    }
}

impl<const DEPTH: usize, C> Tree<DEPTH, C> {
    /// Generate the [`Path`] for slot `index`
    ///
    /// Paths are snapshots: any later write that shares an ancestor changes siblings, so a fresh
    /// path is needed to prove against the new root.
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<5>::new(Element::ZERO);
    /// let first = tree.append(Element::new(1)).unwrap();
    /// let stale = tree.path_for(first).unwrap();
    ///
    /// tree.append(Element::new(2)).unwrap();
    ///
    /// // still a valid proof against the old root, but not the new one
    /// assert!(stale.proves(Element::new(1)));
    /// assert_ne!(stale.actual_root_hash(), tree.root_hash());
    /// assert!(tree.path_for(first).unwrap().proves(Element::new(1)));
    /// ```
    pub fn path_for(&self, index: u64) -> Result<Path<DEPTH>, Error> {
        if index >= Self::CAPACITY {
            return Err(Error::IndexOutOfRange {
                index,
                capacity: Self::CAPACITY,
            });
        }

        let mut siblings = [Element::ZERO; DEPTH];
        let mut node = &self.tree;

        // walk down from the root, filling siblings from the top level
        for height in (1..=DEPTH).rev() {
            let level = height - 1;

            match node {
                Node::Parent { left, right, .. } => match (index >> level) & 1 {
                    0 => {
                        siblings[level] = right.hash(&self.empty_hashes);
                        node = left;
                    }
                    _ => {
                        siblings[level] = left.hash(&self.empty_hashes);
                        node = right;
                    }
                },
                // below an empty node every sibling is an empty subtree
                Node::Empty { .. } => {
                    siblings[..height].copy_from_slice(&self.empty_hashes[..height]);
                    break;
                }
                Node::Leaf(_) => unreachable!("leaves only exist at height 0"),
            }
        }

        Ok(Path {
            siblings,
            index,
            root_hash: self.root_hash(),
        })
    }

    /// Generate the [`Path`] for the first slot holding `leaf`
    ///
    /// The empty sentinel resolves to the lowest slot that was never written. Returns `None` if
    /// no slot holds `leaf`.
    ///
    /// ```rust
    /// # use commitment_tree::*;
    /// let mut tree = Tree::<5>::new(Element::ZERO);
    /// tree.update_leaf(0, Element::new(9)).unwrap();
    ///
    /// let path = tree.path_for_leaf(Element::new(9)).unwrap();
    /// assert_eq!(path.index, 0);
    /// assert_eq!(path.steps().count(), 5);
    ///
    /// assert!(tree.path_for_leaf(Element::new(10)).is_none());
    /// ```
    #[must_use]
    pub fn path_for_leaf(&self, leaf: Element) -> Option<Path<DEPTH>> {
        let index = match self.tree.find(DEPTH, 0, leaf) {
            Some(index) => index,
            None if leaf == self.empty_leaf() => self.tree.first_unwritten(DEPTH, 0)?,
            None => return None,
        };

        self.path_for(index).ok()
    }
}

impl Node {
    /// The lowest written slot holding `leaf`, where `offset` is the first index under `self`
    fn find(&self, height: usize, offset: u64, leaf: Element) -> Option<u64> {
        match self {
            Self::Leaf(value) => (*value == leaf).then_some(offset),
            Self::Empty { .. } => None,
            Self::Parent { left, right, .. } => {
                let half = 1 << (height - 1);

                left.find(height - 1, offset, leaf)
                    .or_else(|| right.find(height - 1, offset + half, leaf))
            }
        }
    }

    fn first_unwritten(&self, height: usize, offset: u64) -> Option<u64> {
        match self {
            Self::Leaf(_) => None,
            Self::Empty { .. } => Some(offset),
            Self::Parent { left, right, .. } => {
                let half = 1 << (height - 1);

                left.first_unwritten(height - 1, offset)
                    .or_else(|| right.first_unwritten(height - 1, offset + half))
            }
        }
    }
}
