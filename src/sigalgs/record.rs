use {
    super::AlgorithmAdapter,
    crate::{
        asn1::Interpretation,
        tls::{SignatureAndHashAlgorithm, SignatureScheme},
    },
    der::asn1::ObjectIdentifier as Oid,
    std::{
        fmt::{self, Display, Formatter},
        sync::Arc,
    },
};

/// One injected algorithm under its three identifiers.
#[derive(Clone, Debug)]
pub struct AlgorithmRecord {
    name:       String,
    oid:        Oid,
    code_point: SignatureScheme,
    adapter:    Arc<dyn AlgorithmAdapter>,

    /// Declared once by the adapter, so payloads are never read in a guessed
    /// interpretation.
    public_key_encoding: Interpretation,
}

impl AlgorithmRecord {
    pub fn new(
        name: impl Into<String>,
        oid: Oid,
        code_point: SignatureScheme,
        adapter: Arc<dyn AlgorithmAdapter>,
    ) -> Self {
        let public_key_encoding = adapter.public_key_encoding();
        Self {
            name: name.into(),
            oid,
            code_point,
            adapter,
            public_key_encoding,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn oid(&self) -> &Oid {
        &self.oid
    }

    pub const fn code_point(&self) -> SignatureScheme {
        self.code_point
    }

    pub const fn signature_and_hash(&self) -> SignatureAndHashAlgorithm {
        self.code_point.signature_and_hash()
    }

    pub const fn adapter(&self) -> &Arc<dyn AlgorithmAdapter> {
        &self.adapter
    }

    pub const fn public_key_encoding(&self) -> Interpretation {
        self.public_key_encoding
    }

    /// Whether any of the three identifiers is shared with `other`.
    pub fn collides_with(&self, other: &Self) -> bool {
        self.name == other.name || self.oid == other.oid || self.code_point == other.code_point
    }
}

impl Display for AlgorithmRecord {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.oid, self.code_point)
    }
}
