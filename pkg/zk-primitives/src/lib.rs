#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Field elements and the Poseidon hash shared by the commitment tree, the note model and the
//! proof statement
//!
//! Every value that ends up inside a proof is an [`Element`]. Hashing is done with
//! [`hash_merge`], which must agree bit-for-bit with the in-circuit hash, so there is exactly one
//! implementation of it.

mod element;
mod error;
mod hash;
mod path;

pub use element::Element;
pub use error::{HashError, InvalidFieldElement};
pub use hash::{hash_merge, hash_slice, try_hash_merge, MAX_HASH_ARITY};
pub use path::compute_merkle_root;

/// The base element used by cryptographic operations
///
/// This is (roughly) an integer modulo `p` where `p` is [`Element::MODULUS`]
pub type Base = poseidon_circuit::Bn256Fr;
