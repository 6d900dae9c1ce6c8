use crate::Element;
use core::num::TryFromIntError;
use ethnum::U256;
use std::str::FromStr;

macro_rules! from_int_impls {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Element {
                #[inline]
                fn from(value: $t) -> Self {
                    Element(U256::from(value))
                }
            }

            impl TryFrom<Element> for $t {
                type Error = TryFromIntError;

                #[inline]
                fn try_from(value: Element) -> Result<Self, Self::Error> {
                    <$t>::try_from(value.0)
                }
            }
        )*
    };
}

from_int_impls!(u8, u16, u32, u64, u128);

impl From<bool> for Element {
    #[inline]
    fn from(value: bool) -> Self {
        match value {
            false => Self::ZERO,
            true => Self::ONE,
        }
    }
}

/// Parses hex, with or without a `0x` prefix
impl FromStr for Element {
    type Err = <U256 as FromStr>::Err;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(U256::from_str_radix(s, 16)?))
    }
}

impl From<U256> for Element {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<Element> for U256 {
    fn from(value: Element) -> Self {
        value.0
    }
}

impl Element {
    /// The big-endian bytes of this [`Element`]
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let mut one = [0; 32];
    /// one[31] = 1;
    ///
    /// assert_eq!(Element::ONE.to_be_bytes(), one);
    /// ```
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// The little-endian bytes of this [`Element`]
    #[inline]
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; 32] {
        self.0.to_le_bytes()
    }

    /// Read an [`Element`] from big-endian bytes
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }

    /// Read an [`Element`] from little-endian bytes
    #[inline]
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Element::from_str("0").unwrap(), Element::ZERO);
        assert_eq!(Element::from_str("0x1").unwrap(), Element::ONE);
        assert_eq!(Element::from_str("0x6a296c").unwrap(), Element::new(6_957_420));
        assert!(Element::from_str("0xzz").is_err());
    }

    #[proptest]
    fn byte_orders_agree(element: Element) {
        let mut reversed = element.to_le_bytes();
        reversed.reverse();

        assert_eq!(reversed, element.to_be_bytes());
        assert_eq!(Element::from_be_bytes(element.to_be_bytes()), element);
    }

    #[test]
    fn narrowing_conversions() {
        assert_eq!(u64::try_from(Element::new(42)), Ok(42));
        assert!(u64::try_from(Element::from(u128::MAX)).is_err());
    }
}
