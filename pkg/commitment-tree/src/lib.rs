#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! # An incremental commitment tree
//!
//! A fixed-depth binary Merkle [`Tree`] over note commitments. Leaves are addressed by index, and
//! every slot starts out holding the same *empty leaf* sentinel.
//!
//! ```rust
//! # use commitment_tree::*;
//! let empty_leaf = Element::new(5_769_240);
//!
//! // a depth 5 tree has 32 leaf slots
//! let mut tree = Tree::<5>::new(empty_leaf);
//! assert_eq!(tree.capacity(), 32);
//!
//! let index = tree.append(Element::new(123)).unwrap();
//! assert_eq!(index, 0);
//!
//! // a path has exactly one sibling per level
//! let path = tree.path_for(index).unwrap();
//! assert_eq!(path.steps().count(), 5);
//! assert!(path.proves(Element::new(123)));
//! ```
//!
//! ## Root hash
//!
//! Internal nodes are `hash_merge([left, right])`. Order matters, since a leaf's position is part
//! of what the root commits to. The root is a pure function of the ordered leaf sequence, which
//! [`root_of_leaves`] recomputes from scratch.
//!
//! ## Allocation
//!
//! [`Tree::append`] writes at an insertion counter that only ever grows, and fails with
//! [`Error::TreeFull`] once every slot has been handed out. [`Tree::update_leaf`] writes at an
//! explicit index (for mirrors that replay someone else's allocation) and bumps the counter past
//! that index, so an `append` never lands on a slot that was already written.

mod error;
mod hash;
/// Caching of parent hashes
pub mod hash_cache;
mod tree;

pub use error::Error;
pub use hash::{empty_subtree_hashes, root_of_leaves};
pub use tree::{Direction, Path, PathStep, Tree};
pub use zk_primitives::{hash_merge, Element};
