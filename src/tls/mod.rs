//! TLS wire identifiers.

mod signature_scheme;

pub use self::signature_scheme::{SignatureAndHashAlgorithm, SignatureScheme};
