use zk_primitives::{hash_merge, Element};

use crate::SpendWitness;

use super::{Proof, ProofVerifier, PublicInputs};

/// A stand-in proof system for tests and demos
///
/// A proof is a keyed Poseidon tag over the public inputs. Honest proofs come from
/// [`MockProofSystem::prove`], which takes a [`SpendWitness`] that checked the spend relation when
/// it was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockProofSystem {
    key: Element,
}

impl MockProofSystem {
    /// A proof system keyed by `key`; proofs from one key don't verify under another
    #[must_use]
    pub fn new(key: Element) -> Self {
        Self { key }
    }

    /// Prove the statement of an already validated witness
    #[must_use]
    pub fn prove<const DEPTH: usize>(&self, witness: &SpendWitness<DEPTH>) -> Proof {
        self.prove_unchecked(&witness.public_inputs())
    }

    /// Produce a proof for arbitrary public inputs, for testing how the pool treats proofs of
    /// statements no honest prover would make
    #[must_use]
    pub fn prove_unchecked(&self, public_inputs: &PublicInputs) -> Proof {
        Proof::new(self.tag(public_inputs).to_be_bytes().to_vec())
    }

    fn tag(&self, public_inputs: &PublicInputs) -> Element {
        public_inputs
            .as_slice()
            .iter()
            .fold(self.key, |acc, &input| hash_merge([acc, input]))
    }
}

impl ProofVerifier for MockProofSystem {
    fn verify(&self, proof: &Proof, public_inputs: &PublicInputs) -> bool {
        proof.as_bytes() == self.tag(public_inputs).to_be_bytes()
    }
}

/// Accepts every proof
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ProofVerifier for AcceptAll {
    fn verify(&self, _proof: &Proof, _public_inputs: &PublicInputs) -> bool {
        true
    }
}

/// Rejects every proof
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl ProofVerifier for RejectAll {
    fn verify(&self, _proof: &Proof, _public_inputs: &PublicInputs) -> bool {
        false
    }
}
