use {
    crate::{asn1::public_key_info::Interpretation, tls::SignatureScheme},
    der::asn1::ObjectIdentifier as Oid,
    std::fmt::{self, Display, Formatter},
    thiserror::Error,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no algorithm registered for {0}")]
    NotFound(Lookup),

    #[error("no registered algorithm supports the given key parameter")]
    UnsupportedParameter,

    #[error("malformed key info: {0}")]
    Decode(#[from] der::Error),

    #[error("public key payload for {oid} is not {expected} encoded")]
    InterpretationMismatch {
        oid:      Oid,
        expected: Interpretation,
    },

    #[error("{key} is already registered")]
    DuplicateRegistration { key: String },

    #[error("provider does not allow removing {key}")]
    RemovalUnsupported { key: String },

    #[error("signature engine: {0}")]
    EngineState(&'static str),

    #[error("invalid object identifier: {0}")]
    InvalidOid(#[from] const_oid::Error),

    #[error("algorithm adapter failed: {0:#}")]
    Adapter(#[from] anyhow::Error),
}

/// The identifier a failed lookup was keyed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Name(String),
    Oid(Oid),
    CodePoint(SignatureScheme),
}

impl Display for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name {name:?}"),
            Self::Oid(oid) => write!(f, "OID {oid}"),
            Self::CodePoint(scheme) => write!(f, "signature scheme {scheme}"),
        }
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
