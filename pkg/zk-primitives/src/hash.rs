use poseidon_circuit::poseidon::primitives::{ConstantLength, Hash, P128Pow5T3};

use crate::{Base, Element, HashError, InvalidFieldElement};

/// The largest number of elements [`hash_slice`] accepts
pub const MAX_HASH_ARITY: usize = 6;

/// Poseidon hash of a fixed number of elements
///
/// With `N = 2` this is the parent of two tree nodes, i.e.: `parent = hash_merge([left, right])`.
/// The note model uses `N = 1` (owner tags) and `N = 4` (commitments, nullifiers).
///
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(1), Element::new(2)]);
/// let b = hash_merge([Element::new(1), Element::new(3)]);
/// let c = hash_merge([Element::new(1), Element::new(2), Element::ZERO]);
///
/// assert_ne!(a, b);
/// assert_ne!(a, c);
/// ```
/// This operation is not symmetric:
/// ```rust
/// # use zk_primitives::*;
/// let a = Element::new(1);
/// let b = Element::new(2);
///
/// assert_ne!(hash_merge([a, b]), hash_merge([b, a]));
/// ```
///
/// Inputs are reduced modulo [`Element::MODULUS`]. Callers holding untrusted values should use
/// [`try_hash_merge`] instead.
#[inline]
#[must_use]
pub fn hash_merge<const N: usize>(elements: [Element; N]) -> Element {
    type H<const N: usize> = Hash<Base, P128Pow5T3<Base>, ConstantLength<N>, 3, 2>;

    let hash = H::<N>::init().hash(elements.map(Element::to_base));
    Element::from_base(hash)
}

/// [`hash_merge`], but fails instead of reducing a non-canonical input
///
/// ```rust
/// # use zk_primitives::*;
/// let ok = try_hash_merge([Element::new(1), Element::new(2)]);
/// assert_eq!(ok, Ok(hash_merge([Element::new(1), Element::new(2)])));
///
/// let err = try_hash_merge([Element::ONE, Element::MODULUS]).unwrap_err();
/// assert_eq!(err.element, Element::MODULUS);
/// ```
#[inline]
pub fn try_hash_merge<const N: usize>(
    elements: [Element; N],
) -> Result<Element, InvalidFieldElement> {
    for element in elements {
        element.check_field()?;
    }

    Ok(hash_merge(elements))
}

/// Hash a runtime-length sequence of elements
///
/// This dispatches to [`try_hash_merge`] with the matching arity, so
/// `hash_slice(&[a, b, c])` equals `hash_merge([a, b, c])`.
///
/// ```rust
/// # use zk_primitives::*;
/// let parts = [Element::new(4), Element::new(69), Element::new(6_957_420)];
/// assert_eq!(hash_slice(&parts), Ok(hash_merge(parts)));
///
/// assert_eq!(hash_slice(&[]), Err(HashError::UnsupportedArity(0)));
/// ```
pub fn hash_slice(elements: &[Element]) -> Result<Element, HashError> {
    let hash = match *elements {
        [a] => try_hash_merge([a])?,
        [a, b] => try_hash_merge([a, b])?,
        [a, b, c] => try_hash_merge([a, b, c])?,
        [a, b, c, d] => try_hash_merge([a, b, c, d])?,
        [a, b, c, d, e] => try_hash_merge([a, b, c, d, e])?,
        [a, b, c, d, e, f] => try_hash_merge([a, b, c, d, e, f])?,
        _ => return Err(HashError::UnsupportedArity(elements.len())),
    };

    Ok(hash)
}
