use zk_primitives::{Element, InvalidFieldElement};

/// A [`Result`](core::result::Result) defaulting to this crate's [`Error`]
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Why a transition was refused
///
/// Every variant is terminal for the attempted transition: nothing has been written, and the
/// caller must rebuild its witness (usually against a fresh root) before trying again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input was not a canonical field element
    #[error(transparent)]
    InvalidFieldElement(#[from] InvalidFieldElement),

    /// A leaf index outside the tree
    #[error("leaf index {index} is out of range for a tree with {capacity} slots")]
    IndexOutOfRange {
        /// The offending index
        index: u64,
        /// The number of slots in the tree
        capacity: u64,
    },

    /// The tree has no room for the outputs of this transition
    #[error("the commitment tree is full ({capacity} slots)")]
    TreeFull {
        /// The number of slots in the tree
        capacity: u64,
    },

    /// The proof was built against a root this ledger has never had
    #[error("unknown root {0}")]
    UnknownRoot(Element),

    /// The note behind this nullifier has already been spent
    #[error("nullifier {0} has already been spent")]
    NullifierAlreadySpent(Element),

    /// The verifier rejected the proof
    #[error("invalid proof")]
    InvalidProof,

    /// The proof's public inputs don't match the values the caller asserted
    #[error("public inputs don't match the request: {0}")]
    PublicInputMismatch(Mismatch),

    /// An output carries an external amount where none is allowed
    #[error("output {output} carries an external amount, which this transition doesn't allow")]
    ExternalAmountNotAllowed {
        /// The position of the output in the request
        output: usize,
    },

    /// A deposit of nothing
    #[error("deposits must carry a nonzero value")]
    ZeroValueDeposit,

    /// A withdrawal with a payout but nowhere to send it
    #[error("a recipient is required to withdraw")]
    RecipientRequired,

    /// A deposit's note opening doesn't match its commitment, value or asset
    #[error("the note opening doesn't match the deposited commitment")]
    CommitmentMismatch,

    /// The pool holds less of an asset than a withdrawal pays out
    #[error("the pool holds {available} of asset {asset_id}, but {requested} was requested")]
    InsufficientPoolBalance {
        /// The asset being withdrawn
        asset_id: Element,
        /// The pool's balance of that asset
        available: Element,
        /// The payout amount
        requested: Element,
    },

    /// A deposit would push the pool's balance of an asset out of the field
    #[error("the pool's balance of asset {asset_id} would overflow")]
    BalanceOverflow {
        /// The asset being deposited
        asset_id: Element,
    },

    /// The ledger moved on since this transition was validated
    #[error("the ledger changed since this transition was validated")]
    StaleTransition,

    /// An error from the persistence layer
    #[cfg(feature = "storage")]
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::Error),
}

impl From<commitment_tree::Error> for Error {
    fn from(error: commitment_tree::Error) -> Self {
        match error {
            commitment_tree::Error::IndexOutOfRange { index, capacity } => {
                Self::IndexOutOfRange { index, capacity }
            }
            commitment_tree::Error::TreeFull { capacity } => Self::TreeFull { capacity },
        }
    }
}

/// The first public input that disagreed with a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// The public inputs don't have the `3 + 2k` layout for any `k >= 1`
    #[error("{len} public inputs is not a valid layout")]
    Layout {
        /// The number of public inputs received
        len: usize,
    },

    /// The root
    #[error("root")]
    Root,

    /// The nullifier
    #[error("nullifier")]
    Nullifier,

    /// The number of outputs
    #[error("expected {expected} outputs, the proof has {actual}")]
    OutputCount {
        /// The number of outputs in the request
        expected: usize,
        /// The number of outputs in the public inputs
        actual: usize,
    },

    /// An output commitment
    #[error("commitment of output {0}")]
    Commitment(usize),

    /// An output's external amount
    #[error("external amount of output {0}")]
    ExternalAmount(usize),
}
