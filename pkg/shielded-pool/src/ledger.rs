use std::{collections::BTreeMap, ops::Range};

use commitment_tree::{hash_cache::HashCache, hash_cache::NoopHashCache, Path, Tree};
use serde::{Deserialize, Serialize};
use zk_primitives::Element;

use crate::{
    gate::{self, DepositRequest, SpendRequest, Transition, TransitionKind},
    Error, NullifierSet, ProofVerifier, Result, RootHistory,
};

/// Value leaving the pool with a withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Payout {
    /// Where the value goes
    pub recipient: Element,
    /// The asset paid out
    pub asset_id: Element,
    /// How much is paid out
    pub amount: Element,
}

/// The outcome of a committed [`Transition`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Which entry point produced the transition
    pub kind: TransitionKind,
    /// The asset the transition moved
    pub asset_id: Element,
    /// The slots the new commitments were written to
    pub leaves: Range<u64>,
    /// The root after each inserted commitment, all of which are now in the root history
    pub roots: Vec<Element>,
    /// The root after the transition
    pub root: Element,
    /// The nullifier that was spent, if any
    pub nullifier: Option<Element>,
    /// The value paid out of the pool, if any
    pub payout: Option<Payout>,
}

/// The whole state of a shielded pool
///
/// The commitment tree, the history of its roots, the spent nullifiers, and the pool's balance of
/// each asset. The only way to change it is to [`commit`](Ledger::commit) a [`Transition`] checked
/// by the [`gate`].
#[derive(Debug, Clone)]
pub struct Ledger<const DEPTH: usize, C = NoopHashCache> {
    tree: Tree<DEPTH, C>,
    roots: RootHistory,
    nullifiers: NullifierSet,
    balances: BTreeMap<Element, Element>,
    /// The number of transitions committed since this value was created
    version: u64,
}

impl<const DEPTH: usize, C> Ledger<DEPTH, C> {
    /// An empty ledger where every slot holds `empty_leaf`
    ///
    /// The initial root is recorded, so it is known before anything is inserted
    #[must_use]
    pub fn new(empty_leaf: Element) -> Self
    where
        C: Default,
    {
        Self::new_with_cache(empty_leaf, C::default())
    }

    /// An empty ledger whose tree hashes through `cache`
    #[must_use]
    pub fn new_with_cache(empty_leaf: Element, cache: C) -> Self {
        let tree = Tree::new_with_cache(empty_leaf, cache);
        let mut roots = RootHistory::new();
        roots.record(tree.root_hash());

        Self {
            tree,
            roots,
            nullifiers: NullifierSet::new(),
            balances: BTreeMap::new(),
            version: 0,
        }
    }

    /// Reassemble a ledger from its parts, e.g. after loading them from disk
    ///
    /// The tree's current root is recorded if it isn't already in `roots`
    #[must_use]
    pub fn from_parts(
        tree: Tree<DEPTH, C>,
        mut roots: RootHistory,
        nullifiers: NullifierSet,
        balances: BTreeMap<Element, Element>,
    ) -> Self {
        roots.record(tree.root_hash());

        Self {
            tree,
            roots,
            nullifiers,
            balances,
            version: 0,
        }
    }

    /// The current root
    #[inline]
    #[must_use]
    pub fn root(&self) -> Element {
        self.tree.root_hash()
    }

    /// Whether `root` was ever the root of this ledger's tree
    #[inline]
    #[must_use]
    pub fn is_known_root(&self, root: Element) -> bool {
        self.roots.is_known(root)
    }

    /// Whether `nullifier` has been spent
    #[inline]
    #[must_use]
    pub fn is_spent(&self, nullifier: Element) -> bool {
        self.nullifiers.contains(nullifier)
    }

    /// The pool's balance of `asset_id`
    #[must_use]
    pub fn balance(&self, asset_id: Element) -> Element {
        self.balances.get(&asset_id).copied().unwrap_or_default()
    }

    /// Every asset the pool has held, with its balance
    pub fn balances(&self) -> impl Iterator<Item = (Element, Element)> + '_ {
        self.balances.iter().map(|(&asset, &balance)| (asset, balance))
    }

    /// The path for slot `index` against the current root
    pub fn path_for(&self, index: u64) -> Result<Path<DEPTH>> {
        Ok(self.tree.path_for(index)?)
    }

    /// The path for the first slot holding `commitment`
    #[must_use]
    pub fn path_for_commitment(&self, commitment: Element) -> Option<Path<DEPTH>> {
        self.tree.path_for_leaf(commitment)
    }

    /// The commitment tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &Tree<DEPTH, C> {
        &self.tree
    }

    /// The root history
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &RootHistory {
        &self.roots
    }

    /// The spent nullifiers
    #[inline]
    #[must_use]
    pub fn nullifiers(&self) -> &NullifierSet {
        &self.nullifiers
    }

    /// The number of transitions committed since this value was created
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl<const DEPTH: usize, C: HashCache> Ledger<DEPTH, C> {
    /// Apply a transition checked by the [`gate`]
    ///
    /// The transition must have been checked against this exact state; otherwise this fails with
    /// [`Error::StaleTransition`] and nothing changes.
    pub fn commit(&mut self, transition: Transition) -> Result<Receipt> {
        if transition.version != self.version {
            return Err(Error::StaleTransition);
        }

        let Transition {
            kind,
            version: _,
            asset_id,
            nullifier,
            commitments,
            balance,
            payout,
        } = transition;

        if commitments.len() as u64 > self.tree.remaining() {
            return Err(Error::TreeFull {
                capacity: self.tree.capacity(),
            });
        }

        let start = self.tree.next_index();
        let mut roots = Vec::with_capacity(commitments.len());

        // every intermediate root is recorded, since a client may have seen any of them
        for commitment in commitments {
            self.tree.append(commitment)?;

            let root = self.tree.root_hash();
            self.roots.record(root);
            roots.push(root);
        }

        if let Some(nullifier) = nullifier {
            self.nullifiers.insert(nullifier);
        }

        if let Some(balance) = balance {
            self.balances.insert(asset_id, balance);
        }

        self.version += 1;

        let receipt = Receipt {
            kind,
            asset_id,
            leaves: start..self.tree.next_index(),
            roots,
            root: self.tree.root_hash(),
            nullifier,
            payout,
        };

        tracing::info!(
            kind = ?receipt.kind,
            leaves = ?receipt.leaves,
            root = %receipt.root,
            "committed transition"
        );

        Ok(receipt)
    }

    /// Write `value` directly into slot `index` and record the new root
    ///
    /// This skips the [`gate`] entirely, so it is only for ledgers that mirror another one, e.g. a
    /// client rebuilding the tree from observed commitments. It counts as a transition, so any
    /// [`Transition`] checked before it becomes stale.
    pub fn update_leaf(&mut self, index: u64, value: Element) -> Result<Element> {
        self.tree.update_leaf(index, value)?;

        let root = self.tree.root_hash();
        self.roots.record(root);
        self.version += 1;

        Ok(root)
    }

    /// Check and commit a deposit
    pub fn deposit(&mut self, request: DepositRequest) -> Result<Receipt> {
        let transition = gate::deposit(self, &request)?;
        self.commit(transition)
    }

    /// Check and commit a transfer
    pub fn transfer(
        &mut self,
        verifier: &impl ProofVerifier,
        request: &SpendRequest,
    ) -> Result<Receipt> {
        let transition = gate::transfer(self, verifier, request)?;
        self.commit(transition)
    }

    /// Check and commit a withdrawal
    pub fn withdraw(
        &mut self,
        verifier: &impl ProofVerifier,
        request: &SpendRequest,
        recipient: Option<Element>,
    ) -> Result<Receipt> {
        let transition = gate::withdraw(self, verifier, request, recipient)?;
        self.commit(transition)
    }
}

/// Somewhere a [`Ledger`] lives, which decides what committing a transition involves
///
/// The in-memory [`Ledger`] just applies it. [`Persistent`] also writes it to disk.
///
/// [`Persistent`]: crate::storage::Persistent
pub trait Store<const DEPTH: usize>: Send + Sync {
    /// The hash cache of the ledger's tree
    type Cache: HashCache;

    /// The current state
    fn ledger(&self) -> &Ledger<DEPTH, Self::Cache>;

    /// Apply a transition checked against [`Store::ledger`]
    fn commit(&mut self, transition: Transition) -> Result<Receipt>;
}

impl<const DEPTH: usize, C> Store<DEPTH> for Ledger<DEPTH, C>
where
    C: HashCache + Send + Sync,
{
    type Cache = C;

    fn ledger(&self) -> &Ledger<DEPTH, C> {
        self
    }

    fn commit(&mut self, transition: Transition) -> Result<Receipt> {
        Ledger::commit(self, transition)
    }
}

#[cfg(test)]
mod tests {
    use crate::{empty_leaf, Note, SpendingKey, BTC_ASSET_ID, TREE_DEPTH};

    use super::*;

    fn note(amount: u64) -> Note {
        let key = SpendingKey::new(Element::new(1)).unwrap();
        Note::with_psi(key.owner(), Element::new(amount), BTC_ASSET_ID, Element::new(amount)).unwrap()
    }

    #[test]
    fn new_ledger_knows_its_initial_root() {
        let ledger = Ledger::<TREE_DEPTH>::new(empty_leaf());

        assert!(ledger.is_known_root(ledger.root()));
        assert_eq!(ledger.roots().len(), 1);
        assert_eq!(ledger.balance(BTC_ASSET_ID), Element::ZERO);
    }

    #[test]
    fn stale_transitions_are_refused() {
        let mut ledger = Ledger::<TREE_DEPTH>::new(empty_leaf());

        let first = gate::deposit(&ledger, &DepositRequest::for_note(note(1))).unwrap();
        let second = gate::deposit(&ledger, &DepositRequest::for_note(note(2))).unwrap();

        ledger.commit(first).unwrap();
        let root = ledger.root();

        assert!(matches!(ledger.commit(second), Err(Error::StaleTransition)));
        assert_eq!(ledger.root(), root);
        assert_eq!(ledger.balance(BTC_ASSET_ID), Element::new(1));
    }

    #[test]
    fn commit_records_every_intermediate_root() {
        let mut ledger = Ledger::<TREE_DEPTH>::new(empty_leaf());

        let receipt = ledger.deposit(DepositRequest::for_note(note(3))).unwrap();

        assert_eq!(receipt.roots, vec![receipt.root]);
        assert_eq!(receipt.leaves, 0..1);
        assert_eq!(ledger.version(), 1);
        assert_eq!(ledger.tree().leaf(0), Some(note(3).commitment()));
    }

    #[test]
    fn mirrored_writes_record_their_roots() {
        let mut ledger = Ledger::<TREE_DEPTH>::new(empty_leaf());
        let pending = gate::deposit(&ledger, &DepositRequest::for_note(note(4))).unwrap();

        let root = ledger.update_leaf(3, note(5).commitment()).unwrap();

        assert!(ledger.is_known_root(root));
        assert_eq!(ledger.tree().next_index(), 4);
        assert!(matches!(ledger.commit(pending), Err(Error::StaleTransition)));
        assert!(matches!(
            ledger.update_leaf(32, Element::ONE),
            Err(Error::IndexOutOfRange { index: 32, capacity: 32 })
        ));
    }

    #[test]
    fn from_parts_records_the_current_root() {
        let mut tree = Tree::<TREE_DEPTH>::new(empty_leaf());
        tree.append(Element::new(5)).unwrap();

        let ledger = Ledger::from_parts(
            tree.clone(),
            RootHistory::new(),
            NullifierSet::new(),
            BTreeMap::new(),
        );

        assert!(ledger.is_known_root(tree.root_hash()));
    }
}
