//! Pure ASN1 types, no registry logic.
//!
//! Only the key-info structures are modelled. Algorithm parameters and key
//! payloads stay opaque ([`Any`] and [`BitString`](der::asn1::BitString)),
//! their meaning belongs to the algorithm adapter.

pub mod private_key_info;
pub mod public_key_info;

pub use self::{
    private_key_info::PrivateKeyInfo,
    public_key_info::{Interpretation, PublicKeyPayload, SubjectPublicKeyInfo},
};
pub use cms::cert::x509::attr::{Attribute, Attributes};
use der::{asn1::ObjectIdentifier as Oid, Any, Sequence, ValueOrd};

/// RFC 5280 `AlgorithmIdentifier` with opaque parameters.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct AnyAlgorithmIdentifier {
    pub algorithm:  Oid,
    pub parameters: Option<Any>,
}

impl AnyAlgorithmIdentifier {
    /// Identifier with absent parameters, as required for ML-DSA and SLH-DSA.
    pub const fn new(algorithm: Oid) -> Self {
        Self {
            algorithm,
            parameters: None,
        }
    }

    pub fn with_parameters(algorithm: Oid, parameters: Any) -> Self {
        Self {
            algorithm,
            parameters: Some(parameters),
        }
    }
}

impl From<Oid> for AnyAlgorithmIdentifier {
    fn from(algorithm: Oid) -> Self {
        Self::new(algorithm)
    }
}
