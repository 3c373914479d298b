//! RFC 5208 `PrivateKeyInfo`
//!
//! ```text
//! PrivateKeyInfo ::= SEQUENCE {
//!     version                   INTEGER,
//!     privateKeyAlgorithm       AlgorithmIdentifier,
//!     privateKey                OCTET STRING,
//!     attributes           [0]  IMPLICIT Attributes OPTIONAL }
//! ```

use {
    super::{AnyAlgorithmIdentifier, Attributes},
    crate::error::Result,
    der::{
        asn1::{ObjectIdentifier as Oid, OctetString},
        Sequence,
    },
};

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct PrivateKeyInfo {
    pub version:               u64,
    pub private_key_algorithm: AnyAlgorithmIdentifier,
    pub private_key:           OctetString,
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT", optional = "true")]
    pub attributes:            Option<Attributes>,
}

impl PrivateKeyInfo {
    pub const VERSION: u64 = 0;

    pub fn new(algorithm: impl Into<AnyAlgorithmIdentifier>, private_key: &[u8]) -> Result<Self> {
        Ok(Self {
            version:               Self::VERSION,
            private_key_algorithm: algorithm.into(),
            private_key:           OctetString::new(private_key)?,
            attributes:            None,
        })
    }

    #[must_use]
    pub fn with_attributes(mut self, attributes: Option<Attributes>) -> Self {
        self.attributes = attributes;
        self
    }

    pub const fn oid(&self) -> &Oid {
        &self.private_key_algorithm.algorithm
    }

    pub fn private_key_octets(&self) -> &[u8] {
        self.private_key.as_bytes()
    }
}
