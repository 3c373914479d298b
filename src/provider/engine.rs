//! Streaming signature engine bound into a provider under an algorithm name.

use {
    crate::{
        ensure_err,
        error::{Error, Result},
        sigalgs::{AlgorithmAdapter, AlgorithmRecord, AsymmetricKey},
    },
    std::{mem, sync::Arc},
};

/// Creates [`SignatureEngine`]s for one algorithm.
#[derive(Clone, Debug)]
pub struct EngineBinding {
    name:    String,
    adapter: Arc<dyn AlgorithmAdapter>,
}

/// Buffers the message and hands it to the adapter in one piece; injected
/// schemes sign the message itself, not a digest.
#[derive(Debug)]
pub struct SignatureEngine {
    name:    String,
    adapter: Arc<dyn AlgorithmAdapter>,
    state:   State,
    message: Vec<u8>,
}

#[derive(Debug)]
enum State {
    Uninitialized,
    Sign { private_key: Vec<u8> },
    Verify { public_key: Vec<u8> },
}

impl EngineBinding {
    pub fn new(record: &AlgorithmRecord) -> Self {
        Self {
            name:    record.name().to_owned(),
            adapter: Arc::clone(record.adapter()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn adapter(&self) -> &Arc<dyn AlgorithmAdapter> {
        &self.adapter
    }

    pub fn new_engine(&self) -> SignatureEngine {
        SignatureEngine::new(self.name.clone(), Arc::clone(&self.adapter))
    }
}

impl SignatureEngine {
    pub fn new(name: impl Into<String>, adapter: Arc<dyn AlgorithmAdapter>) -> Self {
        Self {
            name: name.into(),
            adapter,
            state: State::Uninitialized,
            message: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn init_sign(&mut self, key: &dyn AsymmetricKey) -> Result<()> {
        ensure_err!(
            key.is_private() && self.adapter.is_supported_parameter(key),
            Error::UnsupportedParameter
        );
        let key_info = self.adapter.create_private_key_info(key, None)?;
        self.state = State::Sign {
            private_key: key_info.private_key_octets().to_vec(),
        };
        self.message.clear();
        Ok(())
    }

    pub fn init_verify(&mut self, key: &dyn AsymmetricKey) -> Result<()> {
        ensure_err!(
            !key.is_private() && self.adapter.is_supported_parameter(key),
            Error::UnsupportedParameter
        );
        let key_info = self.adapter.create_subject_public_key_info(key)?;
        self.state = State::Verify {
            public_key: key_info.key_octets()?.to_vec(),
        };
        self.message.clear();
        Ok(())
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        ensure_err!(
            !matches!(self.state, State::Uninitialized),
            Error::EngineState("not initialized")
        );
        self.message.extend_from_slice(data);
        Ok(())
    }

    pub fn sign(&mut self) -> Result<Vec<u8>> {
        let State::Sign { private_key } = &self.state else {
            return Err(Error::EngineState("not initialized for signing"));
        };
        let message = mem::take(&mut self.message);
        Ok(self.adapter.sign(&message, private_key)?)
    }

    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let State::Verify { public_key } = &self.state else {
            return Err(Error::EngineState("not initialized for verification"));
        };
        let message = mem::take(&mut self.message);
        Ok(self.adapter.verify(&message, public_key, signature)?)
    }
}
