//! Handshake-facing signer and verifier tables.
//!
//! A handshake signs with the algorithm it negotiated by name and verifies
//! the peer's `CertificateVerify` by the code point on the wire.

use {
    super::AlgorithmAdapter,
    crate::{
        error::{Error, Lookup, Result},
        tls::SignatureScheme,
    },
    std::{collections::HashMap, sync::Arc},
    tracing::debug,
};

#[derive(Clone, Debug, Default)]
pub struct SignatureDispatch {
    signers:   HashMap<String, Arc<dyn AlgorithmAdapter>>,
    verifiers: HashMap<SignatureScheme, Arc<dyn AlgorithmAdapter>>,
    schemes:   Vec<SignatureScheme>,
}

impl SignatureDispatch {
    pub(super) fn insert(
        &mut self,
        name: &str,
        code_point: SignatureScheme,
        adapter: &Arc<dyn AlgorithmAdapter>,
    ) {
        self.signers.insert(name.to_owned(), Arc::clone(adapter));
        if self
            .verifiers
            .insert(code_point, Arc::clone(adapter))
            .is_none()
        {
            self.schemes.push(code_point);
        }
    }

    pub(super) fn clear(&mut self) {
        self.signers.clear();
        self.verifiers.clear();
        self.schemes.clear();
    }

    pub fn signer(&self, name: &str) -> Result<&Arc<dyn AlgorithmAdapter>> {
        self.signers
            .get(name)
            .ok_or_else(|| Error::NotFound(Lookup::Name(name.to_owned())))
    }

    pub fn verifier(&self, code_point: SignatureScheme) -> Result<&Arc<dyn AlgorithmAdapter>> {
        self.verifiers
            .get(&code_point)
            .ok_or(Error::NotFound(Lookup::CodePoint(code_point)))
    }

    pub fn sign(&self, name: &str, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        let signer = self.signer(name)?;
        debug!(name, len = message.len(), "Signing with injected algorithm");
        Ok(signer.sign(message, private_key)?)
    }

    pub fn verify(
        &self,
        code_point: SignatureScheme,
        message: &[u8],
        public_key: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let verifier = self.verifier(code_point)?;
        debug!(%code_point, len = message.len(), "Verifying with injected algorithm");
        Ok(verifier.verify(message, public_key, signature)?)
    }

    /// Code points offered in `signature_algorithms`, in registration order.
    pub fn supported_schemes(&self) -> &[SignatureScheme] {
        &self.schemes
    }
}
