use borsh::{BorshDeserialize, BorshSerialize};
use ethnum::U256;

use super::Element;

/// Elements are written as 32 big-endian bytes, so byte order on disk matches numeric order
impl BorshSerialize for Element {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.0.to_be_bytes())
    }
}

impl BorshDeserialize for Element {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut bytes = [0; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self(U256::from_be_bytes(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use super::*;

    #[proptest]
    fn borsh_order_matches_numeric_order(a: Element, b: Element) {
        let a_bytes = borsh::to_vec(&a).unwrap();
        let b_bytes = borsh::to_vec(&b).unwrap();

        assert_eq!(a_bytes.len(), 32);
        assert_eq!(a.cmp(&b), a_bytes.cmp(&b_bytes));
    }
}
