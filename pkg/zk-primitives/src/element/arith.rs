use crate::Element;

/// Implement a binary operation for `Element` and every unsigned integer that converts into one
macro_rules! binop {
    ($trait:ident, $f:ident, $op:tt) => {
        impl core::ops::$trait<Element> for Element {
            type Output = Element;

            #[inline]
            fn $f(self, rhs: Element) -> Self::Output {
                Element(self.0 $op rhs.0)
            }
        }

        binop!(@int $trait, $f, $op, u8, u16, u32, u64, u128);
    };
    (@int $trait:ident, $f:ident, $op:tt, $($int:ty),*) => {
        $(
            impl core::ops::$trait<$int> for Element {
                type Output = Element;

                #[inline]
                fn $f(self, rhs: $int) -> Self::Output {
                    self $op Element::from(rhs)
                }
            }
        )*
    };
}

binop!(Add, add, +);
binop!(Sub, sub, -);
binop!(Mul, mul, *);

impl Element {
    /// Add two amounts, returning `None` if the result leaves the field
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::new(2).checked_add(Element::new(3)), Some(Element::new(5)));
    ///
    /// let largest = Element::MODULUS - 1u64;
    /// assert_eq!(largest.checked_add(Element::ONE), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn checked_add(self, rhs: Element) -> Option<Element> {
        self.0
            .checked_add(rhs.0)
            .map(Element)
            .filter(Element::is_canonical)
    }

    /// Subtract `rhs` from `self`, returning `None` on underflow
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// assert_eq!(Element::new(5).checked_sub(Element::new(3)), Some(Element::new(2)));
    /// assert_eq!(Element::new(3).checked_sub(Element::new(5)), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn checked_sub(self, rhs: Element) -> Option<Element> {
        self.0.checked_sub(rhs.0).map(Element)
    }
}

impl core::iter::Sum<Element> for Element {
    fn sum<I: Iterator<Item = Element>>(iter: I) -> Self {
        iter.fold(Element::ZERO, |a, b| a + b)
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[test]
    fn syntax_test() {
        let element = Element::new(123);

        assert_eq!(element + 1u64, Element::new(124));
        assert_eq!(element * 2u64, Element::new(246));
        assert_eq!(element - 2u8, Element::new(121));
        assert_eq!(element + Element::ONE, Element::new(124));

        assert_eq!((1..=10).map(Element::new).sum::<Element>(), Element::new(55));
    }

    #[proptest]
    fn checked_add_stays_in_field(a: Element, b: Element) {
        match a.checked_add(b) {
            Some(sum) => {
                assert!(sum.is_canonical());
                assert_eq!(sum.checked_sub(b), Some(a));
            }
            None => assert!(a.to_u256() + b.to_u256() >= Element::MODULUS.to_u256()),
        }
    }
}
