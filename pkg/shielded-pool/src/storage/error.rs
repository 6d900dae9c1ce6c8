use zk_primitives::Element;

/// An error that can occur when interacting with a [`Persistent`] ledger
///
/// [`Persistent`]: crate::storage::Persistent
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from rocksdb
    #[error("rocksdb error: {0}")]
    Rocksdb(#[from] rocksdb::Error),

    /// Stored bytes couldn't be encoded or decoded
    #[error("format error: {0}")]
    Format(#[from] std::io::Error),

    /// A stored value has a version newer than this build understands
    #[error("cannot upgrade past version {version}")]
    MaxVersion {
        /// The highest version this build knows
        version: u64,
    },

    /// The database was created for a different empty leaf
    #[error("the database was created with empty leaf {stored}, but {requested} was requested")]
    EmptyLeafMismatch {
        /// The empty leaf in the database
        stored: Element,
        /// The empty leaf passed to [`Persistent::open`](crate::storage::Persistent::open)
        requested: Element,
    },

    /// Database consistency
    #[error("the database contained inconsistent data")]
    DatabaseConsistency,
}

impl From<commitment_tree::Error> for Error {
    fn from(_: commitment_tree::Error) -> Self {
        Self::DatabaseConsistency
    }
}
