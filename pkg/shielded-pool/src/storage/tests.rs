use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use tempdir::TempDir;

use crate::{
    empty_leaf, gate,
    proof::MockProofSystem,
    DepositRequest, Error as PoolError, Note, SharedLedger, SpendRequest, SpendWitness,
    SpendingKey, WitnessOutput, BTC_ASSET_ID, TREE_DEPTH,
};

use super::*;

fn setup_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new("shielded_pool_db_test").unwrap();
    let file = dir.path().join("db");

    (dir, file)
}

fn open(path: &Path) -> Persistent<TREE_DEPTH> {
    Persistent::open(path, empty_leaf()).unwrap()
}

#[test]
fn fresh_database_has_the_initial_root() {
    let (_dir, path) = setup_path();
    let persistent = open(&path);

    let initial = Ledger::<TREE_DEPTH>::new(empty_leaf()).root();
    assert_eq!(persistent.ledger().root(), initial);

    drop(persistent);

    let persistent = open(&path);
    assert_eq!(persistent.ledger().root(), initial);
    assert!(persistent.ledger().is_known_root(initial));
}

#[test]
fn reload_preserves_every_part_of_the_state() {
    let (_dir, path) = setup_path();
    let system = MockProofSystem::new(Element::new(5));
    let mut rng = ChaChaRng::seed_from_u64(5);

    let alice = SpendingKey::random(&mut rng);
    let bob = SpendingKey::random(&mut rng);
    let note = Note::new(alice.owner(), Element::new(69), BTC_ASSET_ID, &mut rng).unwrap();

    let mut persistent = open(&path);

    let transition = gate::deposit(persistent.ledger(), &DepositRequest::for_note(note)).unwrap();
    let deposit = persistent.commit(transition).unwrap();

    let payout = Note::payout(Element::new(24), BTC_ASSET_ID, &mut rng).unwrap();
    let change = Note::new(bob.owner(), Element::new(45), BTC_ASSET_ID, &mut rng).unwrap();
    let witness = SpendWitness::new(
        alice,
        note,
        0,
        persistent.ledger().path_for(0).unwrap(),
        vec![WitnessOutput::payout(payout), WitnessOutput::shielded(change)],
    )
    .unwrap();
    let request = SpendRequest::from_witness(&witness, system.prove(&witness));

    let transition =
        gate::withdraw(persistent.ledger(), &system, &request, Some(Element::new(1))).unwrap();
    let withdraw = persistent.commit(transition).unwrap();

    let before = persistent.ledger().clone();
    drop(persistent);

    let loaded = open(&path);
    let ledger = loaded.ledger();

    assert_eq!(ledger.root(), before.root());
    assert_eq!(ledger.tree().next_index(), 3);
    assert_eq!(
        ledger.tree().leaves().collect::<Vec<_>>(),
        before.tree().leaves().collect::<Vec<_>>()
    );
    assert_eq!(ledger.roots(), before.roots());
    assert_eq!(ledger.nullifiers(), before.nullifiers());
    assert_eq!(ledger.balance(BTC_ASSET_ID), Element::new(45));

    assert!(ledger.is_known_root(deposit.root));
    for root in &withdraw.roots {
        assert!(ledger.is_known_root(*root));
    }
    assert!(ledger.is_spent(request.nullifier));

    // the double spend is still caught after a restart
    assert!(matches!(
        gate::withdraw(ledger, &system, &request, Some(Element::new(1))),
        Err(PoolError::NullifierAlreadySpent(_))
    ));
}

#[test]
fn rejected_transitions_write_nothing() {
    let (_dir, path) = setup_path();
    let mut persistent = open(&path);

    let note = Note::with_psi(Element::ONE, Element::new(3), BTC_ASSET_ID, Element::ONE).unwrap();
    let first = gate::deposit(persistent.ledger(), &DepositRequest::for_note(note)).unwrap();
    let stale = first.clone();

    persistent.commit(first).unwrap();
    assert!(matches!(
        persistent.commit(stale),
        Err(PoolError::StaleTransition)
    ));

    drop(persistent);

    let loaded = open(&path);
    assert_eq!(loaded.ledger().tree().next_index(), 1);
    assert_eq!(loaded.ledger().balance(BTC_ASSET_ID), Element::new(3));
}

#[test]
fn failed_writes_leave_the_ledger_untouched() {
    let (_dir, path) = setup_path();
    let system = MockProofSystem::new(Element::new(6));
    let mut rng = ChaChaRng::seed_from_u64(6);

    let alice = SpendingKey::random(&mut rng);
    let bob = SpendingKey::random(&mut rng);
    let note = Note::new(alice.owner(), Element::new(10), BTC_ASSET_ID, &mut rng).unwrap();
    let output = Note::new(bob.owner(), Element::new(10), BTC_ASSET_ID, &mut rng).unwrap();

    let mut persistent = open(&path);
    let transition = gate::deposit(persistent.ledger(), &DepositRequest::for_note(note)).unwrap();
    let index = persistent.commit(transition).unwrap().leaves.start;

    let witness = SpendWitness::new(
        alice,
        note,
        index,
        persistent.ledger().path_for(index).unwrap(),
        vec![WitnessOutput::shielded(output)],
    )
    .unwrap();
    let request = SpendRequest::from_witness(&witness, system.prove(&witness));

    let root = persistent.ledger().root();
    let version = persistent.ledger().version();

    let transition = gate::transfer(persistent.ledger(), &system, &request).unwrap();
    let result = persistent.commit_with(transition, |_, _, _| Err(Error::DatabaseConsistency));

    assert!(matches!(
        result,
        Err(PoolError::Storage(Error::DatabaseConsistency))
    ));
    assert_eq!(persistent.ledger().root(), root);
    assert_eq!(persistent.ledger().version(), version);
    assert_eq!(persistent.ledger().tree().next_index(), 1);
    assert!(!persistent.ledger().is_spent(request.nullifier));

    // the same spend goes through once writes work again
    let transition = gate::transfer(persistent.ledger(), &system, &request).unwrap();
    let receipt = persistent.commit(transition).unwrap();
    drop(persistent);

    let loaded = open(&path);
    assert_eq!(loaded.ledger().root(), receipt.root);
    assert!(loaded.ledger().is_spent(request.nullifier));
}

#[test]
fn empty_leaf_is_fixed_at_creation() {
    let (_dir, path) = setup_path();
    drop(open(&path));

    let result = Persistent::<TREE_DEPTH>::open(&path, Element::new(1));

    assert!(matches!(
        result,
        Err(Error::EmptyLeafMismatch { stored, requested })
            if stored == empty_leaf() && requested == Element::new(1)
    ));
}

#[test]
fn persist_hashes_works() {
    let (_dir, path) = setup_path();
    let mut persistent = open(&path);

    for i in 1..=4 {
        let note = Note::with_psi(Element::ONE, Element::new(i), BTC_ASSET_ID, Element::ONE).unwrap();
        let transition = gate::deposit(persistent.ledger(), &DepositRequest::for_note(note)).unwrap();
        persistent.commit(transition).unwrap();
    }

    persistent.persist_hashes().unwrap();

    drop(persistent);

    // now when we load the tree, every hash should come from the cache
    let persistent = open(&path);
    let metrics = persistent.ledger().tree().cache().metrics();

    assert!(metrics.hashes() > 0);
    assert_eq!(metrics.cache_misses(), 0);
}

#[test]
fn shared_persistent_ledger() {
    let (_dir, path) = setup_path();
    let shared = SharedLedger::<TREE_DEPTH, _, _>::new(
        open(&path),
        MockProofSystem::new(Element::ONE),
    );

    let note = Note::with_psi(Element::ONE, Element::new(9), BTC_ASSET_ID, Element::ONE).unwrap();
    let receipt = shared.deposit(DepositRequest::for_note(note)).unwrap();

    let persistent = shared.into_inner();
    drop(persistent);

    assert_eq!(open(&path).ledger().root(), receipt.root);
}
