//! The state transition gate
//!
//! Each entry point is a pure check of a request against a [`Ledger`], producing a [`Transition`]
//! that [`Ledger::commit`] applies. Nothing is written until every check has passed, so a rejected
//! request leaves the ledger exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::warn;
use zk_primitives::Element;

use crate::{
    Error, Ledger, Mismatch, Note, OutputClaim, Payout, Proof, ProofVerifier, PublicInputs,
    Result, SpendWitness, Statement,
};

/// Which entry point produced a [`Transition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Value entering the pool
    Deposit,
    /// Value moving between notes inside the pool
    Transfer,
    /// Value leaving the pool
    Withdraw,
}

/// A request to add a note to the pool, backed by value from outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRequest {
    /// The commitment of the new note
    pub commitment: Element,
    /// The asset being deposited
    pub asset_id: Element,
    /// The value entering the pool
    pub value: Element,
    /// The note behind `commitment`, if the depositor reveals it
    ///
    /// When present, the gate checks the commitment really encodes `value` of `asset_id`
    pub opening: Option<Note>,
}

impl DepositRequest {
    /// Deposit `note`, revealing it so the gate can check its value
    #[must_use]
    pub fn for_note(note: Note) -> Self {
        Self {
            commitment: note.commitment(),
            asset_id: note.asset_id(),
            value: note.amount(),
            opening: Some(note),
        }
    }
}

/// A request to spend a note, for either [`transfer`] or [`withdraw`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRequest {
    /// The proof of the spend
    pub proof: Proof,
    /// The public inputs the proof claims to prove
    pub public_inputs: PublicInputs,
    /// The root the spent note was proven against
    pub root: Element,
    /// The nullifier of the spent note
    pub nullifier: Element,
    /// The outputs to insert, in order
    pub outputs: Vec<OutputClaim>,
}

impl SpendRequest {
    /// The request an honest client sends for `witness`
    #[must_use]
    pub fn from_witness<const DEPTH: usize>(witness: &SpendWitness<DEPTH>, proof: Proof) -> Self {
        Self {
            proof,
            public_inputs: witness.public_inputs(),
            root: witness.root(),
            nullifier: witness.nullifier(),
            outputs: witness.output_claims(),
        }
    }
}

/// A request that passed every check, ready to be applied with [`Ledger::commit`]
///
/// A transition is tied to the exact ledger state it was checked against: committing it after any
/// other transition fails with [`Error::StaleTransition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub(crate) kind: TransitionKind,
    pub(crate) version: u64,
    pub(crate) asset_id: Element,
    pub(crate) nullifier: Option<Element>,
    pub(crate) commitments: Vec<Element>,
    /// The asset's pool balance after this transition, if it changes
    pub(crate) balance: Option<Element>,
    pub(crate) payout: Option<Payout>,
}

impl Transition {
    /// Which entry point produced this transition
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// The nullifier this transition spends, if any
    #[inline]
    #[must_use]
    pub fn nullifier(&self) -> Option<Element> {
        self.nullifier
    }

    /// The commitments this transition appends, in order
    #[inline]
    #[must_use]
    pub fn commitments(&self) -> &[Element] {
        &self.commitments
    }

    /// The value this transition pays out of the pool, if any
    #[inline]
    #[must_use]
    pub fn payout(&self) -> Option<&Payout> {
        self.payout.as_ref()
    }
}

/// Check a deposit
///
/// Fails with [`Error::ZeroValueDeposit`] for a zero value, [`Error::CommitmentMismatch`] if the
/// opening doesn't match, and [`Error::TreeFull`] if there's no slot left.
#[tracing::instrument(skip_all, fields(commitment = %request.commitment, value = %request.value))]
pub fn deposit<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    request: &DepositRequest,
) -> Result<Transition> {
    check_deposit(ledger, request).inspect_err(|error| warn!(%error, "rejected deposit"))
}

/// Check a transfer inside the pool
///
/// In order: the root must be known ([`Error::UnknownRoot`]), the nullifier unspent
/// ([`Error::NullifierAlreadySpent`]), the proof valid ([`Error::InvalidProof`]), its public inputs
/// equal to the request ([`Error::PublicInputMismatch`]), and every external amount zero
/// ([`Error::ExternalAmountNotAllowed`]). Finally there must be room for the outputs.
#[tracing::instrument(skip_all, fields(nullifier = %request.nullifier, root = %request.root))]
pub fn transfer<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    verifier: &impl ProofVerifier,
    request: &SpendRequest,
) -> Result<Transition> {
    check_transfer(ledger, verifier, request).inspect_err(|error| warn!(%error, "rejected transfer"))
}

/// Check a withdrawal to `recipient`
///
/// The same checks as [`transfer`], except one output may carry a nonzero external amount, which
/// is paid out of the pool to `recipient`. A second payout fails with
/// [`Error::ExternalAmountNotAllowed`], a payout without a recipient with
/// [`Error::RecipientRequired`], and a payout larger than the pool's balance of the asset with
/// [`Error::InsufficientPoolBalance`].
#[tracing::instrument(skip_all, fields(nullifier = %request.nullifier, root = %request.root))]
pub fn withdraw<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    verifier: &impl ProofVerifier,
    request: &SpendRequest,
    recipient: Option<Element>,
) -> Result<Transition> {
    check_withdraw(ledger, verifier, request, recipient)
        .inspect_err(|error| warn!(%error, "rejected withdrawal"))
}

fn check_deposit<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    request: &DepositRequest,
) -> Result<Transition> {
    let DepositRequest {
        commitment,
        asset_id,
        value,
        opening,
    } = *request;

    commitment.check_field()?;
    asset_id.check_field()?;
    value.check_field()?;

    if value.is_zero() {
        return Err(Error::ZeroValueDeposit);
    }

    if let Some(note) = opening {
        let matches = note.commitment() == commitment
            && note.amount() == value
            && note.asset_id() == asset_id;

        if !matches {
            return Err(Error::CommitmentMismatch);
        }
    }

    ensure_capacity(ledger, 1)?;

    let balance = ledger
        .balance(asset_id)
        .checked_add(value)
        .ok_or(Error::BalanceOverflow { asset_id })?;

    Ok(Transition {
        kind: TransitionKind::Deposit,
        version: ledger.version(),
        asset_id,
        nullifier: None,
        commitments: vec![commitment],
        balance: Some(balance),
        payout: None,
    })
}

fn check_transfer<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    verifier: &impl ProofVerifier,
    request: &SpendRequest,
) -> Result<Transition> {
    let statement = check_spend(ledger, verifier, request)?;

    if let Some(output) = request
        .outputs
        .iter()
        .position(|output| !output.external_amount.is_zero())
    {
        return Err(Error::ExternalAmountNotAllowed { output });
    }

    ensure_capacity(ledger, request.outputs.len())?;

    Ok(Transition {
        kind: TransitionKind::Transfer,
        version: ledger.version(),
        asset_id: statement.asset_id,
        nullifier: Some(request.nullifier),
        commitments: commitments(request),
        balance: None,
        payout: None,
    })
}

fn check_withdraw<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    verifier: &impl ProofVerifier,
    request: &SpendRequest,
    recipient: Option<Element>,
) -> Result<Transition> {
    let statement = check_spend(ledger, verifier, request)?;
    let asset_id = statement.asset_id;

    let mut amount = None;
    for (output, claim) in request.outputs.iter().enumerate() {
        if claim.external_amount.is_zero() {
            continue;
        }

        if amount.is_some() {
            return Err(Error::ExternalAmountNotAllowed { output });
        }

        amount = Some(claim.external_amount);
    }

    let (payout, balance) = match amount {
        // nothing leaves the pool, so this is a transfer in all but name
        None => (None, None),
        Some(amount) => {
            let recipient = recipient.ok_or(Error::RecipientRequired)?.check_field()?;
            let available = ledger.balance(asset_id);

            let remaining = available
                .checked_sub(amount)
                .ok_or(Error::InsufficientPoolBalance {
                    asset_id,
                    available,
                    requested: amount,
                })?;

            let payout = Payout {
                recipient,
                asset_id,
                amount,
            };

            (Some(payout), Some(remaining))
        }
    };

    ensure_capacity(ledger, request.outputs.len())?;

    Ok(Transition {
        kind: TransitionKind::Withdraw,
        version: ledger.version(),
        asset_id,
        nullifier: Some(request.nullifier),
        commitments: commitments(request),
        balance,
        payout,
    })
}

/// The checks shared by every spend, returning the proven statement
fn check_spend<const DEPTH: usize, C>(
    ledger: &Ledger<DEPTH, C>,
    verifier: &impl ProofVerifier,
    request: &SpendRequest,
) -> Result<Statement> {
    let SpendRequest {
        proof,
        public_inputs,
        root,
        nullifier,
        outputs,
    } = request;

    root.check_field()?;
    nullifier.check_field()?;
    for output in outputs {
        output.commitment.check_field()?;
        output.external_amount.check_field()?;
    }
    public_inputs.check_field()?;

    if !ledger.is_known_root(*root) {
        return Err(Error::UnknownRoot(*root));
    }

    if ledger.is_spent(*nullifier) {
        return Err(Error::NullifierAlreadySpent(*nullifier));
    }

    if !verifier.verify(proof, public_inputs) {
        return Err(Error::InvalidProof);
    }

    let statement = public_inputs.decode()?;
    let mismatch = |mismatch| Err(Error::PublicInputMismatch(mismatch));

    if statement.root != *root {
        return mismatch(Mismatch::Root);
    }

    if statement.nullifier != *nullifier {
        return mismatch(Mismatch::Nullifier);
    }

    if statement.outputs.len() != outputs.len() {
        return mismatch(Mismatch::OutputCount {
            expected: outputs.len(),
            actual: statement.outputs.len(),
        });
    }

    for (index, (proven, claimed)) in statement.outputs.iter().zip(outputs).enumerate() {
        if proven.commitment != claimed.commitment {
            return mismatch(Mismatch::Commitment(index));
        }

        if proven.external_amount != claimed.external_amount {
            return mismatch(Mismatch::ExternalAmount(index));
        }
    }

    Ok(statement)
}

fn ensure_capacity<const DEPTH: usize, C>(ledger: &Ledger<DEPTH, C>, count: usize) -> Result<()> {
    let tree = ledger.tree();

    match count as u64 <= tree.remaining() {
        true => Ok(()),
        false => Err(Error::TreeFull {
            capacity: tree.capacity(),
        }),
    }
}

fn commitments(request: &SpendRequest) -> Vec<Element> {
    request
        .outputs
        .iter()
        .map(|output| output.commitment)
        .collect()
}
