use std::fmt::{Debug, Display, LowerHex, UpperHex};

use crate::Element;
use ethnum::U256;

macro_rules! fmt_impl {
    ($t:ident, $u:ident) => {
        impl $u for Element {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                <U256 as $t>::fmt(&self.0, f)
            }
        }
    };
    ($t:ident) => {
        fmt_impl!($t, $t);
    };
}

// hashes read best in hex, so `{}` and `{:?}` both print hex
fmt_impl!(LowerHex, Display);
fmt_impl!(LowerHex, Debug);
fmt_impl!(LowerHex);
fmt_impl!(UpperHex);
