use std::collections::HashSet;

use commitment_tree::{
    hash_cache::{KnownHash, SimpleHashCache},
    Tree,
};
use rocksdb::{IteratorMode, WriteBatch, DB};
use zk_primitives::Element;

use crate::{gate::TransitionKind, Ledger, Receipt};

use super::{
    format::{KeyFormat, KeyV1, ValueFormat, ValueV1, Versioned},
    Error,
};

/// Write the state of a new database: its empty leaf and initial root
pub(super) fn write_genesis(db: &DB, empty_leaf: Element, root: Element) -> Result<(), Error> {
    let mut batch = WriteBatch::default();

    batch.put(KeyV1::EmptyLeaf.encode()?, ValueV1::Element(empty_leaf).encode()?);
    batch.put(KeyV1::NextIndex.encode()?, ValueV1::Index(0).encode()?);
    batch.put(KeyV1::Root(root).encode()?, ValueV1::Present.encode()?);

    db.write(batch)?;

    Ok(())
}

/// Write everything a committed transition changed, atomically
pub(super) fn write_receipt<const DEPTH: usize>(
    db: &DB,
    ledger: &Ledger<DEPTH, SimpleHashCache>,
    receipt: &Receipt,
) -> Result<(), Error> {
    let tree = ledger.tree();
    let mut batch = WriteBatch::default();

    for index in receipt.leaves.clone() {
        let leaf = tree.leaf(index).ok_or(Error::DatabaseConsistency)?;
        batch.put(KeyV1::Leaf(index).encode()?, ValueV1::Element(leaf).encode()?);
    }

    batch.put(
        KeyV1::NextIndex.encode()?,
        ValueV1::Index(tree.next_index()).encode()?,
    );

    for &root in &receipt.roots {
        batch.put(KeyV1::Root(root).encode()?, ValueV1::Present.encode()?);
    }

    if let Some(nullifier) = receipt.nullifier {
        batch.put(KeyV1::Nullifier(nullifier).encode()?, ValueV1::Present.encode()?);
    }

    if receipt.kind == TransitionKind::Deposit || receipt.payout.is_some() {
        let balance = ledger.balance(receipt.asset_id);
        batch.put(
            KeyV1::Balance(receipt.asset_id).encode()?,
            ValueV1::Element(balance).encode()?,
        );
    }

    db.write(batch)?;

    Ok(())
}

pub(super) fn synchronize_hashes<const DEPTH: usize>(
    db: &DB,
    tree: &Tree<DEPTH, SimpleHashCache>,
) -> Result<(), Error> {
    // we take hashes from the tree rather than the cache because the cache might have been
    // recently evicted
    let in_memory_hashes = tree.known_hashes();

    let in_db_hashes = db
        .iterator(IteratorMode::Start)
        .filter_map(|result| {
            let (key, value) = result.ok()?;

            let KeyFormat::V1(KeyV1::KnownHash { left, right }) = KeyFormat::from_bytes(&key).ok()?
            else {
                return None;
            };

            let ValueFormat::V1(ValueV1::Element(result)) = ValueFormat::from_bytes(&value).ok()?
            else {
                return None;
            };

            Some(KnownHash {
                left,
                right,
                result,
            })
        })
        .collect::<HashSet<_>>();

    let mut batch = WriteBatch::default();

    for hash in in_memory_hashes {
        if in_db_hashes.contains(&hash) {
            continue;
        }

        let KnownHash {
            left,
            right,
            result,
        } = hash;

        batch.put(
            KeyV1::KnownHash { left, right }.encode()?,
            ValueV1::Element(result).encode()?,
        );
    }

    db.write(batch)?;

    Ok(())
}
