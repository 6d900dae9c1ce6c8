use ethnum::U256;

mod arith;
mod convert;
mod field;
mod fmt;

#[cfg(feature = "borsh")]
mod borsh_impls;

#[cfg(feature = "rand")]
mod rand_impls;

#[cfg(feature = "serde")]
mod serde;

/// A 256-bit unsigned integer that is (usually) a member of the BN254 scalar field
///
/// The wrapper can represent any value in `0..=(2^256 - 1)`, but only values below
/// [`Element::MODULUS`] are *canonical*. Hashing and proof statements work over the field, so
/// anything coming from outside the process should go through [`Element::check_field`] first.
///
/// [`Base`]: crate::Base
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Element(#[cfg_attr(feature = "serde", serde(with = "serde"))] pub(crate) U256);

impl Element {
    /// The additive identity
    pub const ZERO: Self = Self(U256::ZERO);

    /// The multiplicative identity
    pub const ONE: Self = Self(U256::ONE);

    /// The largest representable value (not canonical)
    pub const MAX: Self = Self(U256::MAX);

    /// Create a new [`Element`] from a u64
    ///
    /// This is largely provided to help type inference in simple cases
    #[inline]
    #[must_use]
    pub const fn new(i: u64) -> Self {
        Self(U256::from_words(0, i as u128))
    }

    /// The inner [`U256`]
    #[inline]
    #[must_use]
    pub fn to_u256(self) -> U256 {
        self.0
    }

    /// Big-endian hex, without a `0x` prefix
    #[inline]
    #[must_use]
    pub fn to_hex(self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Whether this element is zero
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! partial_eq_impl {
    ($($int:ty),*) => {
        $(
            impl PartialEq<$int> for Element {
                fn eq(&self, other: &$int) -> bool {
                    *self == Element::from(*other)
                }
            }
        )*
    };
}

partial_eq_impl!(u8, u16, u32, u64, u128);

#[cfg(any(test, feature = "proptest"))]
pub mod proptest {
    use super::Element;
    use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};
    use ethnum::U256;

    /// Arbitrary elements are always canonical, since that is what every caller of the hash
    /// actually works with
    impl Arbitrary for Element {
        type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
        type Parameters = ();

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            any::<[u8; 32]>().prop_map(|array| {
                let mut element = Self(U256::from_be_bytes(array));
                element.canonicalize();
                element
            })
        }
    }
}
