use core::fmt;

use rand::{CryptoRng, RngCore};
use zk_primitives::{hash_merge, Element, InvalidFieldElement};

/// The secret that controls every note owned by [`SpendingKey::owner`]
///
/// The secret itself never leaves the client: the pool only sees the one-way owner tag and, when a
/// note is spent, a nullifier derived from it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SpendingKey(Element);

impl SpendingKey {
    /// Wrap an existing secret
    pub fn new(secret: Element) -> Result<Self, InvalidFieldElement> {
        secret.check_field().map(Self)
    }

    /// Generate a fresh secret
    #[must_use]
    pub fn random(rng: impl RngCore + CryptoRng) -> Self {
        Self(Element::secure_random(rng))
    }

    /// The secret
    #[inline]
    #[must_use]
    pub fn secret(&self) -> Element {
        self.0
    }

    /// The owner tag notes for this key are addressed to, `hash_merge([secret])`
    #[must_use]
    pub fn owner(&self) -> Element {
        hash_merge([self.0])
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpendingKey").field(&"<redacted>").finish()
    }
}

/// A unit of value held in the pool
///
/// `psi` is a per-note random salt, so two notes with the same owner, amount and asset still have
/// unrelated commitments.
///
/// ```rust
/// # use shielded_pool::*;
/// # use rand::thread_rng;
/// let key = SpendingKey::random(thread_rng());
/// let a = Note::new(key.owner(), Element::new(10), BTC_ASSET_ID, thread_rng()).unwrap();
/// let b = Note::new(key.owner(), Element::new(10), BTC_ASSET_ID, thread_rng()).unwrap();
///
/// assert_ne!(a.commitment(), b.commitment());
/// assert!(a.is_owned_by(&key));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    owner: Element,
    amount: Element,
    asset_id: Element,
    psi: Element,
}

impl Note {
    /// Create a note with a fresh salt
    pub fn new(
        owner: Element,
        amount: Element,
        asset_id: Element,
        rng: impl RngCore + CryptoRng,
    ) -> Result<Self, InvalidFieldElement> {
        Self::with_psi(owner, amount, asset_id, Element::secure_random(rng))
    }

    /// Create a note with a known salt, e.g. one received from the sender
    pub fn with_psi(
        owner: Element,
        amount: Element,
        asset_id: Element,
        psi: Element,
    ) -> Result<Self, InvalidFieldElement> {
        Ok(Self {
            owner: owner.check_field()?,
            amount: amount.check_field()?,
            asset_id: asset_id.check_field()?,
            psi: psi.check_field()?,
        })
    }

    /// A payout note: `amount` of `asset_id` leaving the pool, owned by [`BURN_OWNER`]
    ///
    /// [`BURN_OWNER`]: crate::BURN_OWNER
    pub fn payout(
        amount: Element,
        asset_id: Element,
        rng: impl RngCore + CryptoRng,
    ) -> Result<Self, InvalidFieldElement> {
        Self::new(crate::BURN_OWNER, amount, asset_id, rng)
    }

    /// The owner tag
    #[inline]
    #[must_use]
    pub fn owner(&self) -> Element {
        self.owner
    }

    /// The amount
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Element {
        self.amount
    }

    /// The asset id
    #[inline]
    #[must_use]
    pub fn asset_id(&self) -> Element {
        self.asset_id
    }

    /// The salt
    #[inline]
    #[must_use]
    pub fn psi(&self) -> Element {
        self.psi
    }

    /// Whether `key` can spend this note
    #[must_use]
    pub fn is_owned_by(&self, key: &SpendingKey) -> bool {
        key.owner() == self.owner
    }

    /// The commitment stored in the tree, `hash_merge([owner, amount, asset_id, psi])`
    #[must_use]
    pub fn commitment(&self) -> Element {
        hash_merge([self.owner, self.amount, self.asset_id, self.psi])
    }

    /// The nullifier published when this note is spent from `leaf_index`
    ///
    /// `hash_merge([leaf_index, secret, amount, asset_id])`: binding the position means the same
    /// note value at two different leaves yields two different nullifiers.
    #[must_use]
    pub fn nullifier(&self, leaf_index: u64, key: &SpendingKey) -> Element {
        hash_merge([
            Element::from(leaf_index),
            key.secret(),
            self.amount,
            self.asset_id,
        ])
    }
}
