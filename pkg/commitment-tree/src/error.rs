/// An error when writing to, or reading a path from, a [`Tree`]
///
/// [`Tree`]: crate::Tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The index does not address a leaf slot
    #[error("leaf index {index} is out of range for a tree with {capacity} leaves")]
    IndexOutOfRange {
        /// The requested index
        index: u64,
        /// The number of leaf slots in the tree
        capacity: u64,
    },

    /// Every leaf slot has already been allocated
    #[error("the tree is full, all {capacity} leaves have been allocated")]
    TreeFull {
        /// The number of leaf slots in the tree
        capacity: u64,
    },
}
