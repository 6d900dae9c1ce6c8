use commitment_tree::Path;
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use zk_primitives::Element;

use crate::{
    gate::{self, DepositRequest, SpendRequest},
    ProofVerifier, Receipt, Result, Store,
};

/// A ledger that can be shared between threads
///
/// Writes (deposits, transfers, withdrawals and path generation) are serialized by a single mutex,
/// so two concurrent spends of one note always have exactly one winner. A write checks its request
/// under a read lock, including verifying the proof, and only takes the write lock to commit, so
/// [`SharedLedger::root`] and [`SharedLedger::is_known_root`] are never blocked for long.
///
/// ```rust
/// # use shielded_pool::*;
/// # use rand::thread_rng;
/// # struct Verifier;
/// # impl ProofVerifier for Verifier {
/// #     fn verify(&self, _: &Proof, _: &PublicInputs) -> bool { false }
/// # }
/// let ledger: SharedLedger<TREE_DEPTH, _, _> =
///     SharedLedger::new(Ledger::<TREE_DEPTH>::new(empty_leaf()), Verifier);
///
/// let key = SpendingKey::random(thread_rng());
/// let note = Note::new(key.owner(), Element::new(1), BTC_ASSET_ID, thread_rng()).unwrap();
///
/// std::thread::scope(|s| {
///     s.spawn(|| ledger.deposit(DepositRequest::for_note(note)).unwrap());
///     s.spawn(|| ledger.root());
/// });
///
/// assert_eq!(ledger.read().ledger().tree().next_index(), 1);
/// ```
pub struct SharedLedger<const DEPTH: usize, S, V> {
    state: RwLock<S>,
    writer: Mutex<()>,
    verifier: V,
}

impl<const DEPTH: usize, S, V> SharedLedger<DEPTH, S, V>
where
    S: Store<DEPTH>,
    V: ProofVerifier,
{
    /// Share `store`, checking spends with `verifier`
    #[must_use]
    pub fn new(store: S, verifier: V) -> Self {
        Self {
            state: RwLock::new(store),
            writer: Mutex::new(()),
            verifier,
        }
    }

    /// Check and commit a deposit
    pub fn deposit(&self, request: DepositRequest) -> Result<Receipt> {
        let _writer = self.writer.lock();

        let transition = gate::deposit(self.state.read().ledger(), &request)?;
        self.state.write().commit(transition)
    }

    /// Check and commit a transfer
    pub fn transfer(&self, request: &SpendRequest) -> Result<Receipt> {
        let _writer = self.writer.lock();

        let transition = gate::transfer(self.state.read().ledger(), &self.verifier, request)?;
        self.state.write().commit(transition)
    }

    /// Check and commit a withdrawal
    pub fn withdraw(&self, request: &SpendRequest, recipient: Option<Element>) -> Result<Receipt> {
        let _writer = self.writer.lock();

        let transition =
            gate::withdraw(self.state.read().ledger(), &self.verifier, request, recipient)?;
        self.state.write().commit(transition)
    }

    /// The path for slot `index` against the current root
    ///
    /// This is ordered with the writes, so the path is always against the latest root at the time
    /// it is generated
    pub fn path_for(&self, index: u64) -> Result<Path<DEPTH>> {
        let _writer = self.writer.lock();

        self.state.read().ledger().path_for(index)
    }

    /// The path for the first slot holding `commitment`, ordered with the writes like
    /// [`SharedLedger::path_for`]
    #[must_use]
    pub fn path_for_commitment(&self, commitment: Element) -> Option<Path<DEPTH>> {
        let _writer = self.writer.lock();

        self.state.read().ledger().path_for_commitment(commitment)
    }

    /// The current root
    #[must_use]
    pub fn root(&self) -> Element {
        self.state.read().ledger().root()
    }

    /// Whether `root` was ever the root of the tree
    #[must_use]
    pub fn is_known_root(&self, root: Element) -> bool {
        self.state.read().ledger().is_known_root(root)
    }

    /// Whether `nullifier` has been spent
    #[must_use]
    pub fn is_spent(&self, nullifier: Element) -> bool {
        self.state.read().ledger().is_spent(nullifier)
    }

    /// The pool's balance of `asset_id`
    #[must_use]
    pub fn balance(&self, asset_id: Element) -> Element {
        self.state.read().ledger().balance(asset_id)
    }

    /// Read access to the underlying store
    ///
    /// Writers wait while the guard is held, so don't keep it around
    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.state.read()
    }

    /// The verifier
    #[inline]
    #[must_use]
    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Stop sharing, returning the store
    #[must_use]
    pub fn into_inner(self) -> S {
        self.state.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use crate::{
        empty_leaf, proof::MockProofSystem, Error, Ledger, Note, SpendWitness, SpendingKey,
        WitnessOutput, BTC_ASSET_ID, TREE_DEPTH,
    };

    use super::*;

    type Shared = SharedLedger<TREE_DEPTH, Ledger<TREE_DEPTH>, MockProofSystem>;

    fn shared() -> Shared {
        SharedLedger::new(
            Ledger::new(empty_leaf()),
            MockProofSystem::new(Element::new(3)),
        )
    }

    #[test]
    fn concurrent_spends_have_one_winner() {
        let ledger = shared();
        let mut rng = ChaChaRng::seed_from_u64(3);

        let alice = SpendingKey::random(&mut rng);
        let note = Note::new(alice.owner(), Element::new(8), BTC_ASSET_ID, &mut rng).unwrap();
        let index = ledger
            .deposit(DepositRequest::for_note(note))
            .unwrap()
            .leaves
            .start;

        // every thread spends the same note, to a different recipient
        let requests: Vec<_> = (0..8)
            .map(|_| {
                let bob = SpendingKey::random(&mut rng);
                let output = Note::new(bob.owner(), Element::new(8), BTC_ASSET_ID, &mut rng).unwrap();
                let path = ledger.path_for(index).unwrap();
                let witness =
                    SpendWitness::new(alice, note, index, path, vec![WitnessOutput::shielded(output)])
                        .unwrap();

                SpendRequest::from_witness(&witness, ledger.verifier().prove(&witness))
            })
            .collect();

        let ledger = &ledger;
        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = requests
                .iter()
                .map(|request| s.spawn(move || ledger.transfer(request)))
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        let winners = results.iter().filter(|result| result.is_ok()).count();
        let losers = results
            .iter()
            .filter(|result| matches!(result, Err(Error::NullifierAlreadySpent(_))))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(losers, 7);
        assert_eq!(ledger.read().tree().next_index(), 2);
    }

    #[test]
    fn concurrent_deposits_get_distinct_leaves() {
        let ledger = shared();

        let notes: Vec<_> = (1..=16u64)
            .map(|i| {
                Note::with_psi(Element::new(i), Element::new(i), BTC_ASSET_ID, Element::new(i))
                    .unwrap()
            })
            .collect();

        let ledger = &ledger;
        let mut leaves: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = notes
                .iter()
                .map(|note| {
                    s.spawn(move || {
                        let receipt = ledger.deposit(DepositRequest::for_note(*note)).unwrap();
                        assert!(ledger.is_known_root(receipt.root));
                        receipt.leaves.start
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        leaves.sort_unstable();

        assert_eq!(leaves, (0..16).collect::<Vec<_>>());
        assert_eq!(ledger.balance(BTC_ASSET_ID), Element::new((1..=16).sum()));
    }

    #[test]
    fn into_inner_returns_the_state() {
        let ledger = shared();
        let root = ledger.root();

        let inner = ledger.into_inner();

        assert_eq!(inner.root(), root);
    }

    #[test]
    fn paths_by_commitment() {
        let ledger = shared();
        let note =
            Note::with_psi(Element::new(2), Element::new(2), BTC_ASSET_ID, Element::new(2)).unwrap();

        assert!(ledger.path_for_commitment(note.commitment()).is_none());

        let receipt = ledger.deposit(DepositRequest::for_note(note)).unwrap();
        let path = ledger.path_for_commitment(note.commitment()).unwrap();

        assert_eq!(path.index, receipt.leaves.start);
        assert_eq!(path.actual_root_hash(), receipt.root);
        assert!(path.proves(note.commitment()));
    }
}
