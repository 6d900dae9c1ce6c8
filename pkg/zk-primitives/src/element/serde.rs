use ethnum::U256;
use serde::{Deserialize, Deserializer, Serializer};

pub(super) fn serialize<S>(u: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    hex::serde::serialize(u.to_be_bytes(), serializer)
}

/// Accepts exactly 32 hex-encoded bytes, with an optional `0x` prefix
pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
    let bytes = <[u8; 32]>::try_from(bytes)
        .map_err(|bytes| serde::de::Error::invalid_length(bytes.len(), &"32 bytes"))?;

    Ok(U256::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use test_strategy::proptest;

    use crate::Element;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Leaf {
        index: u64,
        value: Element,
    }

    #[proptest]
    fn serialize_bijection(value: Element) {
        let leaf = Leaf { index: 3, value };

        let json = serde_json::to_value(&leaf).unwrap();
        let leaf_again: Leaf = serde_json::from_value(json).unwrap();

        assert_eq!(leaf, leaf_again);
    }

    #[test]
    fn prefixed_and_short_inputs() {
        let prefixed = format!("\"0x{}\"", Element::new(7).to_hex());
        let element: Element = serde_json::from_str(&prefixed).unwrap();
        assert_eq!(element, Element::new(7));

        let short = serde_json::from_str::<Element>("\"0x07\"");
        assert!(short.is_err());
    }
}
