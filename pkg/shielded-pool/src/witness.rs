use std::collections::BTreeMap;

use commitment_tree::Path;
use zk_primitives::{Element, InvalidFieldElement};

use crate::{Note, OutputClaim, PublicInputs, SpendingKey, BURN_OWNER};

/// Why a [`SpendWitness`] couldn't be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WitnessError {
    /// The spending key doesn't own the input note
    #[error("the spending key doesn't own the input note")]
    OwnerMismatch,

    /// The path doesn't prove the input commitment at the given leaf index
    #[error("the path doesn't prove the input note at leaf {leaf_index}")]
    PathMismatch {
        /// The claimed leaf index
        leaf_index: u64,
    },

    /// The outputs don't add up to the input, for some asset
    #[error("value of asset {asset_id} is not conserved")]
    ValueNotConserved {
        /// The asset that doesn't balance
        asset_id: Element,
    },

    /// An output with an external amount isn't a well-formed payout note
    #[error("output {output} is not a valid payout")]
    InvalidPayout {
        /// The position of the output
        output: usize,
    },

    /// A value that would end up in the proof is out of the field
    #[error(transparent)]
    InvalidFieldElement(#[from] InvalidFieldElement),

    /// A spend must create at least one output
    #[error("a spend needs at least one output")]
    NoOutputs,
}

/// An output note and the value it takes out of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WitnessOutput {
    /// The output note
    pub note: Note,
    /// The value leaving the pool, zero for a shielded output
    pub external_amount: Element,
}

impl WitnessOutput {
    /// A note that stays in the pool
    #[must_use]
    pub fn shielded(note: Note) -> Self {
        Self {
            note,
            external_amount: Element::ZERO,
        }
    }

    /// A payout note whose whole amount leaves the pool
    ///
    /// Payout notes should be owned by [`BURN_OWNER`], see [`Note::payout`]
    #[must_use]
    pub fn payout(note: Note) -> Self {
        Self {
            note,
            external_amount: note.amount(),
        }
    }

    /// What the pool sees of this output
    #[must_use]
    pub fn claim(&self) -> OutputClaim {
        OutputClaim {
            commitment: self.note.commitment(),
            external_amount: self.external_amount,
        }
    }
}

/// Every input of the spend circuit, checked natively
///
/// Construction checks the relation the proof attests to:
///  - the key's owner tag is the input note's owner
///  - `path` proves the input commitment at `leaf_index`, under `path.actual_root_hash()`
///  - every output is made of canonical field elements
///  - for each asset, the input amount equals the sum of output amounts, where a payout output
///    leaves the pool with exactly its note amount
///
/// so a `SpendWitness` that exists is one a prover can prove. The nullifier is derived here rather
/// than supplied, so it can't disagree with the note.
///
/// ```rust
/// # use shielded_pool::*;
/// # use rand::thread_rng;
/// let mut tree = Tree::<TREE_DEPTH>::new(empty_leaf());
/// let key = SpendingKey::random(thread_rng());
/// let note = Note::new(key.owner(), Element::new(10), BTC_ASSET_ID, thread_rng()).unwrap();
/// let index = tree.append(note.commitment()).unwrap();
///
/// let change = Note::new(key.owner(), Element::new(10), BTC_ASSET_ID, thread_rng()).unwrap();
/// let witness = SpendWitness::new(
///     key,
///     note,
///     index,
///     tree.path_for(index).unwrap(),
///     vec![WitnessOutput::shielded(change)],
/// )
/// .unwrap();
///
/// assert_eq!(witness.root(), tree.root_hash());
/// assert_eq!(witness.nullifier(), note.nullifier(index, &key));
/// ```
#[derive(Debug, Clone)]
pub struct SpendWitness<const DEPTH: usize> {
    key: SpendingKey,
    note: Note,
    path: Path<DEPTH>,
    outputs: Vec<WitnessOutput>,
}

impl<const DEPTH: usize> SpendWitness<DEPTH> {
    /// Build a witness, checking the spend relation
    pub fn new(
        key: SpendingKey,
        note: Note,
        leaf_index: u64,
        path: Path<DEPTH>,
        outputs: Vec<WitnessOutput>,
    ) -> Result<Self, WitnessError> {
        if outputs.is_empty() {
            return Err(WitnessError::NoOutputs);
        }

        path.actual_root_hash().check_field()?;
        for sibling in path.siblings {
            sibling.check_field()?;
        }
        for output in &outputs {
            output.external_amount.check_field()?;
        }

        if !note.is_owned_by(&key) {
            return Err(WitnessError::OwnerMismatch);
        }

        if path.index != leaf_index || !path.proves(note.commitment()) {
            return Err(WitnessError::PathMismatch { leaf_index });
        }

        for (output, WitnessOutput { note: out, external_amount }) in outputs.iter().enumerate() {
            if external_amount.is_zero() {
                continue;
            }

            let well_formed = out.amount() == *external_amount
                && out.owner() == BURN_OWNER
                && out.asset_id() == note.asset_id();

            if !well_formed {
                return Err(WitnessError::InvalidPayout { output });
            }
        }

        check_conservation(&note, &outputs)?;

        Ok(Self {
            key,
            note,
            path,
            outputs,
        })
    }

    /// The note being spent
    #[inline]
    #[must_use]
    pub fn note(&self) -> &Note {
        &self.note
    }

    /// The leaf the spent note sits at
    #[inline]
    #[must_use]
    pub fn leaf_index(&self) -> u64 {
        self.path.index
    }

    /// The root the path was built against
    #[inline]
    #[must_use]
    pub fn root(&self) -> Element {
        self.path.actual_root_hash()
    }

    /// The nullifier this spend publishes
    #[must_use]
    pub fn nullifier(&self) -> Element {
        self.note.nullifier(self.leaf_index(), &self.key)
    }

    /// The outputs, in order
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &[WitnessOutput] {
        &self.outputs
    }

    /// What the pool sees of the outputs, in order
    #[must_use]
    pub fn output_claims(&self) -> Vec<OutputClaim> {
        self.outputs.iter().map(WitnessOutput::claim).collect()
    }

    /// The public inputs of the proof, in the pinned layout
    #[must_use]
    pub fn public_inputs(&self) -> PublicInputs {
        PublicInputs::new(
            self.root(),
            self.nullifier(),
            &self.output_claims(),
            self.note.asset_id(),
        )
    }
}

fn check_conservation(input: &Note, outputs: &[WitnessOutput]) -> Result<(), WitnessError> {
    let mut sums: BTreeMap<Element, Element> = BTreeMap::new();

    for output in outputs {
        let asset_id = output.note.asset_id();
        let sum = sums.entry(asset_id).or_insert(Element::ZERO);

        *sum = sum
            .checked_add(output.note.amount())
            .ok_or(WitnessError::ValueNotConserved { asset_id })?;
    }

    for (&asset_id, &sum) in &sums {
        let expected = match asset_id == input.asset_id() {
            true => input.amount(),
            false => Element::ZERO,
        };

        if sum != expected {
            return Err(WitnessError::ValueNotConserved { asset_id });
        }
    }

    if !sums.contains_key(&input.asset_id()) && !input.amount().is_zero() {
        return Err(WitnessError::ValueNotConserved {
            asset_id: input.asset_id(),
        });
    }

    Ok(())
}
