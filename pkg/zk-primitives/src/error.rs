use crate::Element;

/// An [`Element`] that does not fit in the scalar field
///
/// Values are never reduced silently at a trust boundary, so anything `>= Element::MODULUS`
/// is rejected with this error
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{element} is not a canonical field element")]
pub struct InvalidFieldElement {
    /// The offending value
    pub element: Element,
}

/// An error from the variadic hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    /// One of the inputs was out of range
    #[error(transparent)]
    InvalidFieldElement(#[from] InvalidFieldElement),

    /// The number of inputs is not supported by the hash
    #[error("cannot hash {0} elements, expected between 1 and {}", crate::MAX_HASH_ARITY)]
    UnsupportedArity(usize),
}
