//! rocksdb persistence for a [`Ledger`]
//!
//! Every committed transition is written as a single [`rocksdb::WriteBatch`], so the database
//! always holds the state after some whole number of transitions.

use std::path::Path;

use commitment_tree::hash_cache::SimpleHashCache;
use rocksdb::DB;
use zk_primitives::Element;

use crate::{gate::Transition, Ledger, Receipt, Store};

pub use error::Error;

mod error;
mod format;
mod load;
mod store;

#[cfg(test)]
mod tests;

/// A [`Ledger`] that persists every committed transition to a rocksdb instance
///
/// ```rust
/// # use shielded_pool::*;
/// # use shielded_pool::storage::Persistent;
/// # use rand::thread_rng;
/// # let dir = tempdir::TempDir::new("shielded_pool_doctest").unwrap();
/// # let path = dir.path().join("db");
/// let mut persistent = Persistent::<TREE_DEPTH>::open(&path, empty_leaf()).unwrap();
///
/// let key = SpendingKey::random(thread_rng());
/// let note = Note::new(key.owner(), Element::new(5), BTC_ASSET_ID, thread_rng()).unwrap();
/// let transition = gate::deposit(persistent.ledger(), &DepositRequest::for_note(note)).unwrap();
/// let receipt = persistent.commit(transition).unwrap();
///
/// drop(persistent);
///
/// // now load it again
/// let persistent = Persistent::<TREE_DEPTH>::open(&path, empty_leaf()).unwrap();
/// assert_eq!(persistent.ledger().root(), receipt.root);
/// assert_eq!(persistent.ledger().balance(BTC_ASSET_ID), Element::new(5));
/// ```
pub struct Persistent<const DEPTH: usize> {
    ledger: Ledger<DEPTH, SimpleHashCache>,
    db: DB,
}

impl<const DEPTH: usize> Persistent<DEPTH> {
    /// Open the database at `path`, creating an empty ledger if there isn't one
    ///
    /// An existing database must have been created with the same `empty_leaf`
    pub fn open<P: AsRef<Path>>(path: P, empty_leaf: Element) -> Result<Self, Error> {
        let db = DB::open_default(path)?;
        let ledger = load::load_ledger(&db, empty_leaf)?;

        tracing::info!(
            root = %ledger.root(),
            next_index = ledger.tree().next_index(),
            nullifiers = ledger.nullifiers().len(),
            "opened ledger"
        );

        Ok(Self { ledger, db })
    }

    /// The in-memory ledger
    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &Ledger<DEPTH, SimpleHashCache> {
        &self.ledger
    }

    /// Get a reference to the rocksdb instance
    #[inline]
    #[must_use]
    pub fn db(&self) -> &DB {
        &self.db
    }

    /// Split this instance into the [`Ledger`] and [`DB`] that make up this [`Persistent`]
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Ledger<DEPTH, SimpleHashCache>, DB) {
        let Self { ledger, db } = self;
        (ledger, db)
    }

    /// Apply a transition and persist it
    ///
    /// The transition is applied to a copy of the ledger, which only replaces the in-memory one
    /// once the write succeeds, so the in-memory ledger never holds a transition the database
    /// doesn't.
    pub fn commit(&mut self, transition: Transition) -> crate::Result<Receipt> {
        self.commit_with(transition, store::write_receipt::<DEPTH>)
    }

    fn commit_with<F>(&mut self, transition: Transition, write: F) -> crate::Result<Receipt>
    where
        F: FnOnce(&DB, &Ledger<DEPTH, SimpleHashCache>, &Receipt) -> Result<(), Error>,
    {
        let mut next = self.ledger.clone();
        let receipt = next.commit(transition)?;

        if let Err(error) = write(&self.db, &next, &receipt) {
            tracing::error!(%error, "failed to persist transition");
            return Err(error.into());
        }

        self.ledger = next;

        Ok(receipt)
    }

    /// Store all computed hashes from the in-memory tree into rocksdb
    ///
    /// Note that this function is never called automatically when committing. Known hashes let
    /// [`Persistent::open`] rebuild the tree without hashing
    pub fn persist_hashes(&self) -> Result<(), Error> {
        store::synchronize_hashes(&self.db, self.ledger.tree())
    }
}

impl<const DEPTH: usize> Store<DEPTH> for Persistent<DEPTH> {
    type Cache = SimpleHashCache;

    fn ledger(&self) -> &Ledger<DEPTH, SimpleHashCache> {
        &self.ledger
    }

    fn commit(&mut self, transition: Transition) -> crate::Result<Receipt> {
        Persistent::commit(self, transition)
    }
}
