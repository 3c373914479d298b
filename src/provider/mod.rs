//! Publication of injected algorithms into a host security provider.
//!
//! The provider itself is external. [`SecurityProvider`] is the surface the
//! publisher needs from it and [`ProviderTable`] is an in-memory provider.

mod engine;
mod publisher;

pub use self::{
    engine::{EngineBinding, SignatureEngine},
    publisher::{Leniency, ProviderPublisher, PublisherConfig},
};
use {
    crate::{
        ensure_err,
        error::{Error, Lookup, Result},
        sigalgs::AlgorithmAdapter,
    },
    der::asn1::ObjectIdentifier as Oid,
    std::{
        collections::{BTreeMap, HashMap},
        fmt::{self, Display, Formatter},
        sync::Arc,
    },
};

/// Provider services an algorithm is published under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Service {
    Signature,
    KeyFactory,
    KeyPairGenerator,
    AlgorithmParameters,
}

/// The two string forms an OID alias is looked up under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AliasForm {
    /// `1.2.3.4`
    Dotted,
    /// `OID.1.2.3.4`
    Prefixed,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKey {
    Service {
        service: Service,
        name:    String,
    },
    Alias {
        service: Service,
        oid:     Oid,
        form:    AliasForm,
    },
}

#[derive(Clone, Debug)]
pub enum ProviderEntry {
    /// Alias target, an algorithm name.
    Alias(String),
    Engine(EngineBinding),
}

/// The host provider framework, as far as publishing needs it.
pub trait SecurityProvider {
    fn entry(&self, key: &ProviderKey) -> Option<&ProviderEntry>;

    /// Fails with [`Error::DuplicateRegistration`] if `key` is taken.
    fn add_entry(&mut self, key: ProviderKey, entry: ProviderEntry) -> Result<()>;

    /// Fails with [`Error::RemovalUnsupported`] if the provider does not
    /// allow removing `key`.
    fn remove_entry(&mut self, key: &ProviderKey) -> Result<Option<ProviderEntry>>;

    /// Whether [`SecurityProvider::remove_entry`] would accept `key`.
    fn is_removable(&self, _key: &ProviderKey) -> bool {
        true
    }

    /// Fails with [`Error::DuplicateRegistration`] if `oid` has a converter.
    fn add_key_info_converter(
        &mut self,
        oid: Oid,
        converter: Arc<dyn AlgorithmAdapter>,
    ) -> Result<()>;

    fn remove_key_info_converter(&mut self, oid: &Oid) -> Option<Arc<dyn AlgorithmAdapter>>;
}

/// In-memory [`SecurityProvider`].
#[derive(Debug, Default)]
pub struct ProviderTable {
    entries:              BTreeMap<ProviderKey, ProviderEntry>,
    converters:           HashMap<Oid, Arc<dyn AlgorithmAdapter>>,
    refuse_alias_removal: bool,
}

impl Service {
    pub const ALL: [Self; 4] = [
        Self::Signature,
        Self::KeyFactory,
        Self::KeyPairGenerator,
        Self::AlgorithmParameters,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "Signature",
            Self::KeyFactory => "KeyFactory",
            Self::KeyPairGenerator => "KeyPairGenerator",
            Self::AlgorithmParameters => "AlgorithmParameters",
        }
    }
}

impl AliasForm {
    pub const ALL: [Self; 2] = [Self::Dotted, Self::Prefixed];
}

impl ProviderKey {
    pub fn service(service: Service, name: impl Into<String>) -> Self {
        Self::Service {
            service,
            name: name.into(),
        }
    }

    pub const fn alias(service: Service, oid: Oid, form: AliasForm) -> Self {
        Self::Alias { service, oid, form }
    }

    pub const fn is_alias(&self) -> bool {
        matches!(self, Self::Alias { .. })
    }
}

impl Display for ProviderKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service { service, name } => write!(f, "{}.{name}", service.as_str()),
            Self::Alias {
                service,
                oid,
                form: AliasForm::Dotted,
            } => write!(f, "Alg.Alias.{}.{oid}", service.as_str()),
            Self::Alias {
                service,
                oid,
                form: AliasForm::Prefixed,
            } => write!(f, "Alg.Alias.{}.OID.{oid}", service.as_str()),
        }
    }
}

impl ProviderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that, like some JCA providers, rejects removal of aliases.
    pub fn refusing_alias_removal() -> Self {
        Self {
            refuse_alias_removal: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ProviderKey, &ProviderEntry)> {
        self.entries.iter()
    }

    pub fn key_info_converter(&self, oid: &Oid) -> Option<&Arc<dyn AlgorithmAdapter>> {
        self.converters.get(oid)
    }

    /// Resolves an algorithm name, dotted OID or `OID.`-prefixed OID to the
    /// bound signature engine.
    pub fn resolve_signature(&self, algorithm: &str) -> Option<&EngineBinding> {
        let name = match self.entry(&ProviderKey::service(Service::Signature, algorithm)) {
            Some(ProviderEntry::Engine(binding)) => return Some(binding),
            _ => {
                let (form, dotted) = algorithm.strip_prefix("OID.").map_or(
                    (AliasForm::Dotted, algorithm),
                    |dotted| (AliasForm::Prefixed, dotted),
                );
                let oid = Oid::new(dotted).ok()?;
                match self.entry(&ProviderKey::alias(Service::Signature, oid, form))? {
                    ProviderEntry::Alias(name) => name,
                    ProviderEntry::Engine(_) => return None,
                }
            }
        };
        match self.entry(&ProviderKey::service(Service::Signature, name.as_str()))? {
            ProviderEntry::Engine(binding) => Some(binding),
            ProviderEntry::Alias(_) => None,
        }
    }

    /// Like [`Self::resolve_signature`], but an `OID.`-prefixed string that is
    /// not a valid OID is an [`Error::InvalidOid`] rather than not found.
    pub fn signature_engine(&self, algorithm: &str) -> Result<SignatureEngine> {
        if let Some(dotted) = algorithm.strip_prefix("OID.") {
            Oid::new(dotted)?;
        }
        self.resolve_signature(algorithm)
            .map(EngineBinding::new_engine)
            .ok_or_else(|| Error::NotFound(Lookup::Name(algorithm.to_owned())))
    }
}

impl SecurityProvider for ProviderTable {
    fn entry(&self, key: &ProviderKey) -> Option<&ProviderEntry> {
        self.entries.get(key)
    }

    fn add_entry(&mut self, key: ProviderKey, entry: ProviderEntry) -> Result<()> {
        ensure_err!(
            !self.entries.contains_key(&key),
            Error::DuplicateRegistration {
                key: key.to_string(),
            }
        );
        self.entries.insert(key, entry);
        Ok(())
    }

    fn remove_entry(&mut self, key: &ProviderKey) -> Result<Option<ProviderEntry>> {
        ensure_err!(
            self.is_removable(key),
            Error::RemovalUnsupported {
                key: key.to_string(),
            }
        );
        Ok(self.entries.remove(key))
    }

    fn is_removable(&self, key: &ProviderKey) -> bool {
        !(self.refuse_alias_removal && key.is_alias())
    }

    fn add_key_info_converter(
        &mut self,
        oid: Oid,
        converter: Arc<dyn AlgorithmAdapter>,
    ) -> Result<()> {
        ensure_err!(
            !self.converters.contains_key(&oid),
            Error::DuplicateRegistration {
                key: format!("key info converter for {oid}"),
            }
        );
        self.converters.insert(oid, converter);
        Ok(())
    }

    fn remove_key_info_converter(&mut self, oid: &Oid) -> Option<Arc<dyn AlgorithmAdapter>> {
        self.converters.remove(oid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XYZ: Oid = Oid::new_unwrap("1.2.3.4");

    #[test]
    fn test_key_display() {
        assert_eq!(
            ProviderKey::service(Service::Signature, "XYZ-SIG").to_string(),
            "Signature.XYZ-SIG"
        );
        assert_eq!(
            ProviderKey::alias(Service::Signature, XYZ, AliasForm::Dotted).to_string(),
            "Alg.Alias.Signature.1.2.3.4"
        );
        assert_eq!(
            ProviderKey::alias(Service::KeyFactory, XYZ, AliasForm::Prefixed).to_string(),
            "Alg.Alias.KeyFactory.OID.1.2.3.4"
        );
    }

    #[test]
    fn test_duplicate_entry() {
        let mut table = ProviderTable::new();
        let key = ProviderKey::alias(Service::Signature, XYZ, AliasForm::Dotted);
        assert!(table
            .add_entry(key.clone(), ProviderEntry::Alias("XYZ-SIG".into()))
            .is_ok());
        assert!(matches!(
            table.add_entry(key, ProviderEntry::Alias("OTHER".into())),
            Err(Error::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn test_refuse_alias_removal() {
        let mut table = ProviderTable::refusing_alias_removal();
        let alias = ProviderKey::alias(Service::Signature, XYZ, AliasForm::Prefixed);
        let service = ProviderKey::service(Service::Signature, "XYZ-SIG");
        assert!(!table.is_removable(&alias));
        assert!(table.is_removable(&service));
        assert!(matches!(
            table.remove_entry(&alias),
            Err(Error::RemovalUnsupported { .. })
        ));
        assert!(matches!(table.remove_entry(&service), Ok(None)));
    }
}
