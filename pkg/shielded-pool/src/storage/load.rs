use std::collections::BTreeMap;

use commitment_tree::{
    hash_cache::{KnownHash, SimpleHashCache},
    Tree,
};
use rocksdb::{IteratorMode, DB};
use zk_primitives::Element;

use crate::{Ledger, NullifierSet, RootHistory};

use super::{
    format::{KeyFormat, KeyV1, ValueFormat, ValueV1, Versioned},
    store, Error,
};

pub(super) fn load_ledger<const DEPTH: usize>(
    db: &DB,
    empty_leaf: Element,
) -> Result<Ledger<DEPTH, SimpleHashCache>, Error> {
    let mut stored_empty_leaf = None;
    let mut next_index = 0;
    let mut leaves = Vec::new();
    let mut roots = RootHistory::new();
    let mut nullifiers = NullifierSet::new();
    let mut balances = BTreeMap::new();
    let mut known_hashes = Vec::new();

    for entry in entries(db) {
        match entry? {
            DbEntry::EmptyLeaf(leaf) => stored_empty_leaf = Some(leaf),
            DbEntry::NextIndex(index) => next_index = index,
            DbEntry::Leaf { index, value } => leaves.push((index, value)),
            DbEntry::Root(root) => {
                roots.record(root);
            }
            DbEntry::Nullifier(nullifier) => {
                nullifiers.insert(nullifier);
            }
            DbEntry::Balance { asset_id, balance } => {
                balances.insert(asset_id, balance);
            }
            DbEntry::KnownHash(hash) => known_hashes.push(hash),
        }
    }

    let cache = SimpleHashCache::new();
    cache.provide_known_hashes(known_hashes);

    match stored_empty_leaf {
        // a fresh database
        None => {
            if !leaves.is_empty() || !nullifiers.is_empty() || !roots.is_empty() {
                return Err(Error::DatabaseConsistency);
            }

            let ledger = Ledger::new_with_cache(empty_leaf, cache);
            store::write_genesis(db, empty_leaf, ledger.root())?;

            Ok(ledger)
        }
        Some(stored) if stored != empty_leaf => Err(Error::EmptyLeafMismatch {
            stored,
            requested: empty_leaf,
        }),
        Some(_) => {
            let tree = Tree::restore(empty_leaf, cache, leaves, next_index)?;

            if !roots.is_known(tree.root_hash()) {
                return Err(Error::DatabaseConsistency);
            }

            Ok(Ledger::from_parts(tree, roots, nullifiers, balances))
        }
    }
}

fn entries(db: &DB) -> impl Iterator<Item = Result<DbEntry, Error>> + '_ {
    db.iterator(IteratorMode::Start).map(|result| {
        let (key, value) = result?;

        let KeyFormat::V1(key) = KeyFormat::from_bytes(&key)?;
        let ValueFormat::V1(value) = ValueFormat::from_bytes(&value)?;

        match (key, value) {
            (KeyV1::EmptyLeaf, ValueV1::Element(leaf)) => Ok(DbEntry::EmptyLeaf(leaf)),
            (KeyV1::NextIndex, ValueV1::Index(index)) => Ok(DbEntry::NextIndex(index)),
            (KeyV1::Leaf(index), ValueV1::Element(value)) => Ok(DbEntry::Leaf { index, value }),
            (KeyV1::Root(root), ValueV1::Present) => Ok(DbEntry::Root(root)),
            (KeyV1::Nullifier(nullifier), ValueV1::Present) => Ok(DbEntry::Nullifier(nullifier)),
            (KeyV1::Balance(asset_id), ValueV1::Element(balance)) => {
                Ok(DbEntry::Balance { asset_id, balance })
            }
            (KeyV1::KnownHash { left, right }, ValueV1::Element(result)) => {
                Ok(DbEntry::KnownHash(KnownHash {
                    left,
                    right,
                    result,
                }))
            }
            // Any other case shouldn't be possible
            _ => Err(Error::DatabaseConsistency),
        }
    })
}

/// Possible meanings of a key-value pair in rocksdb
enum DbEntry {
    EmptyLeaf(Element),
    NextIndex(u64),
    Leaf { index: u64, value: Element },
    Root(Element),
    Nullifier(Element),
    Balance { asset_id: Element, balance: Element },
    /// A precomputed hash merge
    KnownHash(KnownHash),
}
