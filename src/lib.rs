//! Injection of additional signature algorithms into a TLS/PKI stack.
//!
//! One logical algorithm is known under three identifiers: a provider name, a
//! certificate OID and a TLS signature scheme code point. An
//! [`AlgorithmRegistry`] keeps the three consistent and dispatches key
//! marshalling and signing to a per-algorithm [`AlgorithmAdapter`]. The
//! [`ProviderPublisher`] pushes the registered algorithms into a host
//! [`SecurityProvider`](provider::SecurityProvider).
//!
//! Registration happens once at startup through `&mut AlgorithmRegistry`;
//! afterwards the registry is shared read-only.

pub mod asn1;
pub mod error;
pub mod provider;
pub mod sigalgs;
pub mod tls;

pub use self::{
    error::{Error, Lookup, Result},
    provider::{ProviderPublisher, PublisherConfig},
    sigalgs::{AlgorithmAdapter, AlgorithmRecord, AlgorithmRegistry, AsymmetricKey},
    tls::SignatureScheme,
};

/// Like [`anyhow::ensure`], but returns the given error value instead.
#[macro_export]
macro_rules! ensure_err {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}
