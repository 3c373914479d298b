use {
    super::{AlgorithmAdapter, AlgorithmRecord, AsymmetricKey, SignatureDispatch},
    crate::{
        asn1::{Attributes, Interpretation, PrivateKeyInfo, PublicKeyPayload, SubjectPublicKeyInfo},
        ensure_err,
        error::{Error, Lookup, Result},
        provider::SignatureEngine,
        tls::{SignatureAndHashAlgorithm, SignatureScheme},
    },
    der::{asn1::ObjectIdentifier as Oid, Decode},
    std::{any::Any, collections::HashMap, sync::Arc},
    tracing::debug,
};

/// Injected signature algorithms indexed by name, OID and code point.
///
/// Populated through `&mut self` during startup, then shared read-only.
/// Records keep their registration order, which is also the order in which
/// adapters are probed for keys that do not name their algorithm.
#[derive(Debug, Default)]
pub struct AlgorithmRegistry {
    records:       Vec<Arc<AlgorithmRecord>>,
    by_name:       HashMap<String, usize>,
    by_oid:        HashMap<Oid, usize>,
    by_code_point: HashMap<SignatureScheme, usize>,
    dispatch:      SignatureDispatch,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an algorithm. Fails without modifying the registry if the name,
    /// OID or code point is already taken.
    pub fn register(
        &mut self,
        name: &str,
        oid: Oid,
        code_point: SignatureScheme,
        adapter: Arc<dyn AlgorithmAdapter>,
    ) -> Result<()> {
        let record = AlgorithmRecord::new(name, oid, code_point, adapter);
        if let Some(key) = self.conflict(&record) {
            return Err(Error::DuplicateRegistration { key });
        }
        debug!(%record, "Registering signature algorithm");
        self.records.push(Arc::new(record));
        self.reindex();
        Ok(())
    }

    /// Adds an algorithm, replacing every record that shares its name, OID or
    /// code point. The new record takes the probe position of the earliest
    /// record it displaces. Returns the displaced records.
    pub fn override_algorithm(
        &mut self,
        name: &str,
        oid: Oid,
        code_point: SignatureScheme,
        adapter: Arc<dyn AlgorithmAdapter>,
    ) -> Vec<Arc<AlgorithmRecord>> {
        let record = AlgorithmRecord::new(name, oid, code_point, adapter);
        let colliding = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, existing)| existing.collides_with(&record))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        let position = colliding.first().copied().unwrap_or(self.records.len());

        let mut displaced = colliding
            .iter()
            .rev()
            .map(|&index| self.records.remove(index))
            .collect::<Vec<_>>();
        displaced.reverse();
        for old in &displaced {
            debug!(%old, new = %record, "Overriding signature algorithm");
        }
        if displaced.is_empty() {
            debug!(%record, "Registering signature algorithm");
        }

        self.records.insert(position, Arc::new(record));
        self.reindex();
        displaced
    }

    fn conflict(&self, record: &AlgorithmRecord) -> Option<String> {
        if self.by_name.contains_key(record.name()) {
            Some(format!("algorithm name {:?}", record.name()))
        } else if self.by_oid.contains_key(record.oid()) {
            Some(format!("OID {}", record.oid()))
        } else if self.by_code_point.contains_key(&record.code_point()) {
            Some(format!("signature scheme {}", record.code_point()))
        } else {
            None
        }
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        self.by_oid.clear();
        self.by_code_point.clear();
        self.dispatch.clear();
        for (index, record) in self.records.iter().enumerate() {
            self.by_name.insert(record.name().to_owned(), index);
            self.by_oid.insert(*record.oid(), index);
            self.by_code_point.insert(record.code_point(), index);
            self.dispatch
                .insert(record.name(), record.code_point(), record.adapter());
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in registration order.
    pub fn records(&self) -> &[Arc<AlgorithmRecord>] {
        &self.records
    }

    pub const fn dispatch(&self) -> &SignatureDispatch {
        &self.dispatch
    }

    pub fn signature_and_hash_algorithms(&self) -> Vec<SignatureAndHashAlgorithm> {
        self.records
            .iter()
            .map(|record| record.signature_and_hash())
            .collect()
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<&AlgorithmRecord> {
        self.by_name
            .get(name)
            .map(|&index| self.records[index].as_ref())
            .ok_or_else(|| Error::NotFound(Lookup::Name(name.to_owned())))
    }

    pub fn lookup_by_oid(&self, oid: &Oid) -> Result<&AlgorithmRecord> {
        self.by_oid
            .get(oid)
            .map(|&index| self.records[index].as_ref())
            .ok_or(Error::NotFound(Lookup::Oid(*oid)))
    }

    pub fn lookup_by_code_point(&self, code_point: SignatureScheme) -> Result<&AlgorithmRecord> {
        self.by_code_point
            .get(&code_point)
            .map(|&index| self.records[index].as_ref())
            .ok_or(Error::NotFound(Lookup::CodePoint(code_point)))
    }

    pub fn is_code_point_supported(&self, code_point: SignatureScheme) -> bool {
        self.by_code_point.contains_key(&code_point)
    }

    pub fn is_oid_supported(&self, oid: &Oid) -> bool {
        self.by_oid.contains_key(oid)
    }

    /// TLS 1.2 form of [`Self::is_code_point_supported`].
    pub fn is_signature_and_hash_supported(&self, hash: u8, signature: u8) -> bool {
        self.is_code_point_supported(SignatureScheme::from_bytes(hash, signature))
    }

    pub fn is_parameter_supported(&self, key: &dyn AsymmetricKey) -> bool {
        self.record_for_key(key).is_ok()
    }

    /// Finds the record owning `key`.
    ///
    /// Keys naming their algorithm go straight to that record. Other keys are
    /// offered to each adapter in registration order and the first one that
    /// accepts wins.
    fn record_for_key(&self, key: &dyn AsymmetricKey) -> Result<&AlgorithmRecord> {
        if let Some(oid) = key.algorithm() {
            return self
                .lookup_by_oid(&oid)
                .ok()
                .filter(|record| record.adapter().is_supported_parameter(key))
                .ok_or(Error::UnsupportedParameter);
        }
        self.records
            .iter()
            .find(|record| record.adapter().is_supported_parameter(key))
            .map(Arc::as_ref)
            .ok_or(Error::UnsupportedParameter)
    }

    pub fn create_private_key_parameter(
        &self,
        key_info: &PrivateKeyInfo,
    ) -> Result<Box<dyn AsymmetricKey>> {
        let record = self.lookup_by_oid(key_info.oid())?;
        Ok(record.adapter().create_private_key_parameter(key_info)?)
    }

    pub fn create_public_key_parameter(
        &self,
        key_info: &SubjectPublicKeyInfo,
        default_params: Option<&dyn Any>,
    ) -> Result<Box<dyn AsymmetricKey>> {
        let record = self.lookup_by_oid(key_info.oid())?;
        Ok(record
            .adapter()
            .create_public_key_parameter(key_info, default_params)?)
    }

    pub fn create_private_key_info(
        &self,
        key: &dyn AsymmetricKey,
        attributes: Option<&Attributes>,
    ) -> Result<PrivateKeyInfo> {
        let record = self.record_for_key(key)?;
        Ok(record.adapter().create_private_key_info(key, attributes)?)
    }

    pub fn create_subject_public_key_info(
        &self,
        key: &dyn AsymmetricKey,
    ) -> Result<SubjectPublicKeyInfo> {
        let record = self.record_for_key(key)?;
        Ok(record.adapter().create_subject_public_key_info(key)?)
    }

    /// Decodes the key payload the way the registered algorithm declares it.
    pub fn parse_public_key(&self, key_info: &SubjectPublicKeyInfo) -> Result<PublicKeyPayload> {
        let record = self.lookup_by_oid(key_info.oid())?;
        let expected = record.public_key_encoding();
        if expected == Interpretation::Nested {
            let octets = key_info.key_octets()?;
            ensure_err!(
                SubjectPublicKeyInfo::from_der(octets).is_ok(),
                Error::InterpretationMismatch {
                    oid: *key_info.oid(),
                    expected,
                }
            );
        }
        key_info.parse_public_key(expected)
    }

    /// A signature engine for the algorithm owning `key`.
    pub fn signature_engine(&self, key: &dyn AsymmetricKey) -> Result<SignatureEngine> {
        let record = self.record_for_key(key)?;
        Ok(SignatureEngine::new(
            record.name(),
            Arc::clone(record.adapter()),
        ))
    }
}
