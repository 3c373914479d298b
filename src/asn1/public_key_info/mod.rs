//! RFC 5280 `SubjectPublicKeyInfo` with an opaque key payload.
//!
//! ```text
//! SubjectPublicKeyInfo ::= SEQUENCE {
//!     algorithm         AlgorithmIdentifier,
//!     subjectPublicKey  BIT STRING }
//! ```
//!
//! The `subjectPublicKey` octets can be read in two ways, and nothing in the
//! encoding says which one applies:
//!
//! * [`Interpretation::Flat`]: the octets are one complete DER value.
//! * [`Interpretation::Nested`]: the octets are another complete
//!   `SubjectPublicKeyInfo`, used when one scheme wraps the key format of
//!   another.
//!
//! There is deliberately no decode without an [`Interpretation`].

use {
    super::AnyAlgorithmIdentifier,
    crate::error::Result,
    der::{
        asn1::{BitString, ObjectIdentifier as Oid},
        Any, Decode, Encode, Sequence, Tag, Tagged, ValueOrd,
    },
    std::fmt::{self, Display, Formatter},
    tracing::warn,
};

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct SubjectPublicKeyInfo {
    pub algorithm:          AnyAlgorithmIdentifier,
    pub subject_public_key: BitString,
}

/// How to read the `subjectPublicKey` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Interpretation {
    /// The payload is a single DER value.
    Flat,

    /// The payload is a complete `SubjectPublicKeyInfo`.
    Nested,
}

/// A decoded `subjectPublicKey` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKeyPayload {
    Flat(Any),
    Nested(Box<SubjectPublicKeyInfo>),
}

impl SubjectPublicKeyInfo {
    /// Wraps raw key octets. The payload is not validated.
    pub fn new(algorithm: impl Into<AnyAlgorithmIdentifier>, key_octets: &[u8]) -> Result<Self> {
        Ok(Self {
            algorithm:          algorithm.into(),
            subject_public_key: BitString::from_bytes(key_octets)?,
        })
    }

    /// DER encodes `value` as the key payload.
    pub fn from_value(
        algorithm: impl Into<AnyAlgorithmIdentifier>,
        value: &impl Encode,
    ) -> Result<Self> {
        Self::new(algorithm, &value.to_der()?)
    }

    /// Nests `inner` as the key payload of an outer key info.
    pub fn wrap(algorithm: impl Into<AnyAlgorithmIdentifier>, inner: &Self) -> Result<Self> {
        Self::from_value(algorithm, inner)
    }

    pub const fn oid(&self) -> &Oid {
        &self.algorithm.algorithm
    }

    /// The raw payload octets.
    pub fn key_octets(&self) -> Result<&[u8]> {
        self.subject_public_key
            .as_bytes()
            .ok_or_else(|| Tag::BitString.value_error().into())
    }

    /// Parses the payload as a single DER value.
    pub fn decode_flat(&self) -> Result<Any> {
        Ok(Any::from_der(self.key_octets()?)?)
    }

    /// Parses the payload as another `SubjectPublicKeyInfo`.
    pub fn decode_nested(&self) -> Result<Self> {
        Ok(Self::from_der(self.key_octets()?)?)
    }

    pub fn parse_public_key(&self, interpretation: Interpretation) -> Result<PublicKeyPayload> {
        Ok(match interpretation {
            Interpretation::Flat => {
                let value = self.decode_flat()?;
                if value.tag() == Tag::Sequence && self.decode_nested().is_ok() {
                    warn!(
                        oid = %self.oid(),
                        "Flat decode of a payload that is a complete nested key info"
                    );
                }
                PublicKeyPayload::Flat(value)
            }
            Interpretation::Nested => PublicKeyPayload::Nested(Box::new(self.decode_nested()?)),
        })
    }
}

impl Display for Interpretation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flat => "flat",
            Self::Nested => "nested",
        })
    }
}

impl PublicKeyPayload {
    pub const fn interpretation(&self) -> Interpretation {
        match self {
            Self::Flat(_) => Interpretation::Flat,
            Self::Nested(_) => Interpretation::Nested,
        }
    }
}
