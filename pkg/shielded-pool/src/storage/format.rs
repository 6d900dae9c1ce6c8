use borsh::{BorshDeserialize, BorshSerialize};
use strum::EnumCount;
use strum_macros::EnumCount;
use zk_primitives::Element;

use super::Error;

/// Types stored with a version tag, which can be upgraded in place when read
pub(super) trait Versioned: Sized + BorshSerialize + BorshDeserialize + EnumCount {
    /// The newest version
    const MAX_VERSION: u64 = <Self as EnumCount>::COUNT as u64;

    /// The version of this value
    fn version(&self) -> u64;

    /// Upgrade to the next version
    fn upgrade_once(self) -> Result<Self, Error>;

    /// Upgrade to [`Self::MAX_VERSION`]
    fn upgrade(mut self) -> Result<Self, Error> {
        while self.version() < Self::MAX_VERSION {
            self = self.upgrade_once()?;
        }

        Ok(self)
    }

    /// Decode and upgrade
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        borsh::from_slice::<Self>(bytes)?.upgrade()
    }

    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(borsh::to_vec(self)?)
    }

    fn max_version_error() -> Error {
        Error::MaxVersion {
            version: Self::MAX_VERSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, EnumCount)]
pub(super) enum KeyFormat {
    V1(KeyV1),
}

impl Versioned for KeyFormat {
    fn version(&self) -> u64 {
        match self {
            Self::V1(_) => 1,
        }
    }

    fn upgrade_once(self) -> Result<Self, Error> {
        match self {
            Self::V1(_) => Err(Self::max_version_error()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum KeyV1 {
    /// The sentinel of unwritten slots, fixed when the database is created
    EmptyLeaf,
    /// The tree's insertion counter
    NextIndex,
    Leaf(u64),
    Root(Element),
    Nullifier(Element),
    Balance(Element),
    KnownHash { left: Element, right: Element },
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, EnumCount)]
pub(super) enum ValueFormat {
    V1(ValueV1),
}

impl Versioned for ValueFormat {
    fn version(&self) -> u64 {
        match self {
            Self::V1(_) => 1,
        }
    }

    fn upgrade_once(self) -> Result<Self, Error> {
        match self {
            Self::V1(_) => Err(Self::max_version_error()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(super) enum ValueV1 {
    /// Set membership, for roots and nullifiers
    Present,
    Index(u64),
    Element(Element),
}

impl KeyV1 {
    pub(super) fn encode(self) -> Result<Vec<u8>, Error> {
        KeyFormat::V1(self).to_bytes()
    }
}

impl ValueV1 {
    pub(super) fn encode(self) -> Result<Vec<u8>, Error> {
        ValueFormat::V1(self).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_read_back() {
        let key = KeyV1::KnownHash {
            left: Element::new(1),
            right: Element::new(2),
        };

        let bytes = key.encode().unwrap();

        assert_eq!(KeyFormat::from_bytes(&bytes).unwrap(), KeyFormat::V1(key));
    }

    #[test]
    fn the_version_tag_comes_first() {
        let bytes = ValueV1::Index(7).encode().unwrap();

        // borsh writes the enum discriminant first, so `V1` is byte 0
        assert_eq!(bytes[0], 0);
        assert_eq!(ValueFormat::MAX_VERSION, 1);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let mut bytes = ValueV1::Present.encode().unwrap();
        bytes[0] = 1;

        assert!(matches!(
            ValueFormat::from_bytes(&bytes),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn upgrading_past_the_latest_version_fails() {
        let key = KeyFormat::V1(KeyV1::NextIndex);

        assert!(matches!(
            key.upgrade_once(),
            Err(Error::MaxVersion { version: 1 })
        ));
    }
}
