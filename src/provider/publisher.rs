use {
    super::{AliasForm, EngineBinding, ProviderEntry, ProviderKey, SecurityProvider, Service},
    crate::{
        ensure_err,
        error::{Error, Result},
        sigalgs::{AlgorithmRecord, AlgorithmRegistry},
    },
    const_oid::db::DB,
    std::sync::Arc,
    tracing::{debug, warn},
};

/// How to handle a conflict the publisher is allowed to tolerate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leniency {
    /// Keep going.
    Allow,

    /// Keep going, but log a warning.
    Warn,

    /// Return an error.
    Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublisherConfig {
    /// An alias that already exists and that the provider refuses to remove.
    /// Engine and converter conflicts are always errors.
    ///
    /// Conflicts that would fail are detected before anything is written, so
    /// a failed publish leaves the provider as it was for that algorithm.
    pub alias_conflicts: Leniency,
}

/// Default behaviour is to warn.
impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            alias_conflicts: Leniency::Warn,
        }
    }
}

/// Publishes registered algorithms into a [`SecurityProvider`].
///
/// Every entry is removed before it is added, so publishing twice, or on top
/// of a built-in algorithm of the same name, replaces what was there.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProviderPublisher {
    config: PublisherConfig,
}

impl ProviderPublisher {
    pub const fn new(config: PublisherConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Publishes every record of `registry`, in registration order.
    pub fn configure<P: SecurityProvider + ?Sized>(
        &self,
        provider: &mut P,
        registry: &AlgorithmRegistry,
    ) -> Result<()> {
        for record in registry.records() {
            self.publish(provider, record)?;
        }
        Ok(())
    }

    pub fn publish<P: SecurityProvider + ?Sized>(
        &self,
        provider: &mut P,
        record: &AlgorithmRecord,
    ) -> Result<()> {
        if let Some(builtin) = DB.by_oid(record.oid()) {
            debug!(%record, builtin, "Publishing over a well-known OID");
        } else {
            debug!(%record, "Publishing signature algorithm");
        }

        let engine = ProviderKey::service(Service::Signature, record.name());
        let aliases = Service::ALL
            .into_iter()
            .flat_map(|service| {
                AliasForm::ALL
                    .into_iter()
                    .map(move |form| ProviderKey::alias(service, *record.oid(), form))
            })
            .collect::<Vec<_>>();
        self.check_conflicts(provider, &engine, &aliases)?;

        replace(provider, engine, ProviderEntry::Engine(EngineBinding::new(record)))?;
        for alias in aliases {
            self.replace_alias(provider, alias, record.name())?;
        }

        provider.remove_key_info_converter(record.oid());
        provider.add_key_info_converter(*record.oid(), Arc::clone(record.adapter()))
    }

    /// Fails on the first entry that exists and cannot be replaced.
    fn check_conflicts<P: SecurityProvider + ?Sized>(
        &self,
        provider: &P,
        engine: &ProviderKey,
        aliases: &[ProviderKey],
    ) -> Result<()> {
        let stuck =
            |key: &ProviderKey| provider.entry(key).is_some() && !provider.is_removable(key);
        ensure_err!(
            !stuck(engine),
            Error::RemovalUnsupported {
                key: engine.to_string(),
            }
        );
        if self.config.alias_conflicts == Leniency::Strict {
            if let Some(alias) = aliases.iter().find(|&alias| stuck(alias)) {
                return Err(Error::DuplicateRegistration {
                    key: alias.to_string(),
                });
            }
        }
        Ok(())
    }

    fn replace_alias<P: SecurityProvider + ?Sized>(
        &self,
        provider: &mut P,
        alias: ProviderKey,
        name: &str,
    ) -> Result<()> {
        match provider.remove_entry(&alias) {
            // The add below then reports the existing alias as a duplicate.
            Ok(_) | Err(Error::RemovalUnsupported { .. }) => {}
            Err(err) => return Err(err),
        }
        match provider.add_entry(alias, ProviderEntry::Alias(name.to_owned())) {
            // Only alias duplicates are tolerated, see `PublisherConfig`.
            Err(Error::DuplicateRegistration { key }) => match self.config.alias_conflicts {
                Leniency::Allow => Ok(()),
                Leniency::Warn => {
                    warn!(%key, name, "Keeping existing provider alias");
                    Ok(())
                }
                Leniency::Strict => Err(Error::DuplicateRegistration { key }),
            },
            result => result,
        }
    }
}

fn replace<P: SecurityProvider + ?Sized>(
    provider: &mut P,
    key: ProviderKey,
    entry: ProviderEntry,
) -> Result<()> {
    provider.remove_entry(&key)?;
    provider.add_entry(key, entry)
}
