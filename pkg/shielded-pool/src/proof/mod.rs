//! The boundary with the proof system
//!
//! The pool never generates proofs. It hands opaque [`Proof`] bytes and the [`PublicInputs`] they
//! claim to prove to a [`ProofVerifier`], and trusts its answer.

use std::sync::Arc;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use zk_primitives::{Element, InvalidFieldElement};

use crate::{Error, Mismatch};

#[cfg(any(test, feature = "test-api"))]
mod mock;

#[cfg(any(test, feature = "test-api"))]
pub use mock::{AcceptAll, MockProofSystem, RejectAll};

/// An opaque proof, as produced by the prover
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct Proof(#[serde(with = "hex::serde")] Vec<u8>);

impl Proof {
    /// Wrap proof bytes
    #[inline]
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The proof bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap the proof bytes
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Something that can check a [`Proof`] against its [`PublicInputs`]
///
/// A `false` answer is final: the transition is rejected with [`Error::InvalidProof`] and never
/// retried.
pub trait ProofVerifier: Send + Sync {
    /// Whether `proof` proves the statement encoded by `public_inputs`
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool;
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for &T {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        (**self).verify(proof, public_inputs)
    }
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for Box<T> {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        (**self).verify(proof, public_inputs)
    }
}

impl<T: ProofVerifier + ?Sized> ProofVerifier for Arc<T> {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        (**self).verify(proof, public_inputs)
    }
}

/// One output of a spend, as the pool sees it
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct OutputClaim {
    /// The commitment of the output note
    pub commitment: Element,
    /// The value leaving the pool with this output, zero for a shielded output
    pub external_amount: Element,
}

impl OutputClaim {
    /// A shielded output with no external amount
    #[inline]
    #[must_use]
    pub fn shielded(commitment: Element) -> Self {
        Self {
            commitment,
            external_amount: Element::ZERO,
        }
    }
}

/// The public inputs of a spend proof, in the exact order the circuit commits to them
///
/// For `k` outputs the layout is
///
/// ```text
/// [root, nullifier, commitment_0, .., commitment_{k-1}, external_0, .., external_{k-1}, asset_id]
/// ```
///
/// Any other order would still be a list of field elements, and a verifier would happily check
/// the wrong statement, so the layout is only ever produced by [`PublicInputs::new`] and read by
/// [`PublicInputs::decode`].
///
/// ```rust
/// # use shielded_pool::*;
/// let outputs = [
///     OutputClaim::shielded(Element::new(10)),
///     OutputClaim { commitment: Element::new(11), external_amount: Element::new(5) },
/// ];
/// let inputs = PublicInputs::new(Element::new(1), Element::new(2), &outputs, Element::new(3));
///
/// assert_eq!(
///     inputs.as_slice(),
///     [1, 2, 10, 11, 0, 5, 3].map(Element::new),
/// );
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct PublicInputs(Vec<Element>);

/// The statement encoded by a set of [`PublicInputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// The root the spent note was proven against
    pub root: Element,
    /// The nullifier of the spent note
    pub nullifier: Element,
    /// The outputs, in order
    pub outputs: Vec<OutputClaim>,
    /// The asset being spent
    pub asset_id: Element,
}

impl PublicInputs {
    /// Encode a statement in the pinned layout
    #[must_use]
    pub fn new(root: Element, nullifier: Element, outputs: &[OutputClaim], asset_id: Element) -> Self {
        let mut elements = Vec::with_capacity(3 + 2 * outputs.len());

        elements.push(root);
        elements.push(nullifier);
        elements.extend(outputs.iter().map(|output| output.commitment));
        elements.extend(outputs.iter().map(|output| output.external_amount));
        elements.push(asset_id);

        Self(elements)
    }

    /// Wrap raw public inputs, e.g. ones received over the wire
    ///
    /// The layout is checked by [`PublicInputs::decode`]
    #[inline]
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Self {
        Self(elements)
    }

    /// The raw elements, in order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Element] {
        &self.0
    }

    /// Check every element is canonical
    pub fn check_field(&self) -> Result<(), InvalidFieldElement> {
        self.0.iter().try_for_each(|element| element.check_field().map(drop))
    }

    /// Read back the statement these inputs encode
    ///
    /// Fails with [`Mismatch::Layout`] unless there are `3 + 2k` elements for some `k >= 1`
    pub fn decode(&self) -> Result<Statement, Error> {
        let len = self.0.len();
        let layout = || Error::PublicInputMismatch(Mismatch::Layout { len });

        if len < 5 || (len - 3) % 2 != 0 {
            return Err(layout());
        }

        let count = (len - 3) / 2;
        let [root, nullifier, rest @ ..] = self.0.as_slice() else {
            return Err(layout());
        };
        let (commitments, rest) = rest.split_at(count);
        let (external_amounts, rest) = rest.split_at(count);
        let [asset_id] = rest else {
            return Err(layout());
        };

        let outputs = commitments
            .iter()
            .zip(external_amounts)
            .map(|(&commitment, &external_amount)| OutputClaim {
                commitment,
                external_amount,
            })
            .collect();

        Ok(Statement {
            root: *root,
            nullifier: *nullifier,
            outputs,
            asset_id: *asset_id,
        })
    }
}

impl From<&Statement> for PublicInputs {
    fn from(statement: &Statement) -> Self {
        Self::new(
            statement.root,
            statement.nullifier,
            &statement.outputs,
            statement.asset_id,
        )
    }
}
