#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! A shielded value-transfer ledger
//!
//! Value lives in [`Note`]s. The pool only ever sees a note's commitment, which is appended to a
//! fixed-depth [`commitment_tree::Tree`], and, once the note is spent, its nullifier. Spends are
//! admitted by the [`gate`] only when a [`ProofVerifier`] accepts a proof over the pinned
//! [`PublicInputs`] layout, the proof was built against a root in the [`RootHistory`], and the
//! nullifier has never been seen.
//!
//! ```rust
//! # use shielded_pool::*;
//! # use rand::thread_rng;
//! let mut ledger = Ledger::<TREE_DEPTH>::new(empty_leaf());
//!
//! let alice = SpendingKey::random(thread_rng());
//! let note = Note::new(alice.owner(), Element::new(69), BTC_ASSET_ID, thread_rng()).unwrap();
//!
//! let receipt = ledger.deposit(DepositRequest::for_note(note)).unwrap();
//!
//! assert_eq!(receipt.leaves, 0..1);
//! assert!(ledger.is_known_root(receipt.root));
//! assert_eq!(ledger.balance(BTC_ASSET_ID), Element::new(69));
//! ```

mod constants;
mod error;
pub mod gate;
mod ledger;
mod note;
mod nullifier;
pub mod proof;
mod root_history;
mod shared;
mod witness;

pub mod config;
pub mod logging;

#[cfg(feature = "storage")]
pub mod storage;

pub use constants::{
    empty_leaf, empty_leaf_for_seed, BTC_ASSET_ID, BURN_OWNER, EMPTY_NOTE_SEED, TREE_DEPTH,
};
pub use error::{Error, Mismatch, Result};
pub use gate::{DepositRequest, SpendRequest, Transition, TransitionKind};
pub use ledger::{Ledger, Payout, Receipt, Store};
pub use note::{Note, SpendingKey};
pub use nullifier::NullifierSet;
pub use proof::{OutputClaim, Proof, ProofVerifier, PublicInputs, Statement};
pub use root_history::RootHistory;
pub use shared::SharedLedger;
pub use witness::{SpendWitness, WitnessError, WitnessOutput};

pub use commitment_tree::{Path, Tree};
pub use zk_primitives::Element;
