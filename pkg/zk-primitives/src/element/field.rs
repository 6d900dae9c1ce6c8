use ethnum::{uint, U256};
use ff::PrimeField;

use crate::{Base, Element, InvalidFieldElement};

impl Element {
    /// The modulus of the BN254 scalar field
    pub const MODULUS: Element = Element(uint!(
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
    ));

    /// Convert this [`Element`] to its [`Base`] representation
    ///
    /// Non-canonical values are reduced by the conversion. Use [`Element::check_field`] first
    /// if that is not acceptable.
    #[inline]
    #[must_use]
    pub fn to_base(self) -> Base {
        let bytes = self.0.to_le_bytes();
        let limbs = core::array::from_fn(|i| {
            let mut limb = [0; 8];
            limb.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            u64::from_le_bytes(limb)
        });

        Base::from_raw(limbs)
    }

    /// Create an [`Element`] from a [`Base`]
    #[inline]
    #[must_use]
    pub fn from_base(base: Base) -> Element {
        Self(U256::from_le_bytes(base.to_repr()))
    }

    /// Reduce this element modulo [`Element::MODULUS`]
    #[inline]
    pub fn canonicalize(&mut self) {
        self.0 %= Self::MODULUS.0;
    }

    /// Whether this element is strictly below [`Element::MODULUS`]
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert!(Element::new(5).is_canonical());
    /// assert!(!Element::MODULUS.is_canonical());
    /// assert!(!Element::MAX.is_canonical());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.0 < Self::MODULUS.0
    }

    /// Return `self` if it is a canonical field element
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::ONE.check_field(), Ok(Element::ONE));
    ///
    /// let err = Element::MODULUS.check_field().unwrap_err();
    /// assert_eq!(err.element, Element::MODULUS);
    /// ```
    #[inline]
    pub fn check_field(self) -> Result<Self, InvalidFieldElement> {
        match self.is_canonical() {
            true => Ok(self),
            false => Err(InvalidFieldElement { element: self }),
        }
    }
}

impl From<Base> for Element {
    fn from(value: Base) -> Self {
        Element::from_base(value)
    }
}

impl From<Element> for Base {
    fn from(value: Element) -> Self {
        value.to_base()
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[proptest]
    fn to_from_base_biject(element: Element) {
        let base = element.to_base();
        let element_again = Element::from_base(base);

        assert_eq!(element, element_again);
    }

    #[test]
    fn modulus_wraps_to_zero() {
        let wrapped = Element::from_base(Element::MODULUS.to_base());
        let wrapped_one = Element::from_base((Element::MODULUS + Element::ONE).to_base());

        assert_eq!(wrapped, Element::ZERO);
        assert_eq!(wrapped_one, Element::ONE);
    }

    #[test]
    fn modulus_matches_decimal_form() {
        let decimal: U256 =
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
                .parse()
                .unwrap();

        assert_eq!(Element::MODULUS.to_u256(), decimal);
    }

    #[test]
    fn largest_canonical_element() {
        let largest = Element::MODULUS - Element::ONE;

        assert_eq!(largest.check_field(), Ok(largest));
        assert!(Element::MODULUS.check_field().is_err());
    }
}
