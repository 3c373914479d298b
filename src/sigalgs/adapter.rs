//! The contract between the registry and an injected algorithm.

use {
    crate::asn1::{Attributes, Interpretation, PrivateKeyInfo, SubjectPublicKeyInfo},
    anyhow::Result,
    der::asn1::ObjectIdentifier as Oid,
    std::{any::Any, fmt::Debug},
};

/// An internal key parameter, public or private.
///
/// Keys are opaque to the registry. A key type that knows its algorithm
/// should return it from [`AsymmetricKey::algorithm`] so the registry can
/// dispatch on it directly instead of probing every adapter.
pub trait AsymmetricKey: Any + Debug + Send + Sync {
    fn is_private(&self) -> bool;

    fn algorithm(&self) -> Option<Oid> {
        None
    }
}

impl dyn AsymmetricKey {
    pub fn downcast_ref<T: AsymmetricKey>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    pub fn is<T: AsymmetricKey>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }
}

/// Per-algorithm signing, verification and key marshalling.
///
/// Implementations must be safe to call concurrently; a registry is shared
/// between handshakes once registration is complete. `sign` and `verify` may
/// block (e.g. on a hardware token).
pub trait AlgorithmAdapter: Debug + Send + Sync {
    /// Signs `message` with the raw private key octets (the PKCS#8
    /// `privateKey` contents).
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>>;

    /// Verifies `signature` over `message` with the raw public key octets
    /// (the `subjectPublicKey` contents).
    fn verify(&self, message: &[u8], public_key: &[u8], signature: &[u8]) -> Result<bool>;

    /// Whether `key` belongs to this algorithm.
    ///
    /// Must be pure and must not accept keys of another algorithm, otherwise
    /// reverse dispatch routes keys to the wrong adapter.
    fn is_supported_parameter(&self, key: &dyn AsymmetricKey) -> bool;

    /// How the `subjectPublicKey` payload of this algorithm is encoded.
    fn public_key_encoding(&self) -> Interpretation;

    fn create_private_key_parameter(
        &self,
        key_info: &PrivateKeyInfo,
    ) -> Result<Box<dyn AsymmetricKey>>;

    /// `default_params` carries algorithm specific context for schemes whose
    /// keys cannot be built from the key info alone.
    fn create_public_key_parameter(
        &self,
        key_info: &SubjectPublicKeyInfo,
        default_params: Option<&dyn Any>,
    ) -> Result<Box<dyn AsymmetricKey>>;

    fn create_private_key_info(
        &self,
        key: &dyn AsymmetricKey,
        attributes: Option<&Attributes>,
    ) -> Result<PrivateKeyInfo>;

    fn create_subject_public_key_info(&self, key: &dyn AsymmetricKey) -> Result<SubjectPublicKeyInfo>;
}
