
use {
    adapter::{ToyAdapter, ToyKey, WRAPPER_OID, XYZ_NAME, XYZ_OID, XYZ_SCHEME},
    anyhow::Result,
    der::{
        asn1::{Null, ObjectIdentifier as Oid, OctetString, SetOfVec, Utf8StringRef},
        Any,
    },
    rand::{rngs::StdRng, Rng, SeedableRng},
    rstest::rstest,
    sigalg_injection::{
        asn1::{
            Attribute, Attributes, Interpretation, PrivateKeyInfo, PublicKeyPayload,
            SubjectPublicKeyInfo,
        },
        AlgorithmAdapter, AlgorithmRegistry, AsymmetricKey, Error, Lookup, SignatureScheme,
    },
    std::{
        any::Any as AnyParams,
        collections::HashSet,
        sync::{Arc, Mutex},
    },
};

const OTHER_OID: Oid = Oid::new_unwrap("1.2.3.5");
const OTHER_SCHEME: SignatureScheme = SignatureScheme::new(0xfe01);

fn xyz_registry() -> Result<(AlgorithmRegistry, Arc<ToyAdapter>)> {
    let adapter = ToyAdapter::flat(XYZ_OID);
    let mut registry = AlgorithmRegistry::new();
    registry.register(XYZ_NAME, XYZ_OID, XYZ_SCHEME, adapter.clone())?;
    Ok((registry, adapter))
}

fn register_toy(
    registry: &mut AlgorithmRegistry,
    name: &str,
    oid: &str,
    code_point: u16,
) -> Result<()> {
    let oid = Oid::new(oid)?;
    let code_point = SignatureScheme::new(code_point);
    registry.register(name, oid, code_point, ToyAdapter::flat(oid))?;
    Ok(())
}

fn same_adapter(a: &Arc<dyn AlgorithmAdapter>, b: &Arc<ToyAdapter>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[test]
fn test_xyz_scenario() -> Result<()> {
    let (registry, _) = xyz_registry()?;

    assert!(registry.is_oid_supported(&Oid::new("1.2.3.4")?));
    assert!(registry.is_code_point_supported(SignatureScheme::new(0xabcd)));
    assert!(registry.is_signature_and_hash_supported(0xab, 0xcd));
    assert!(!registry.is_code_point_supported(SignatureScheme::new(0x0000)));
    assert!(!registry.is_signature_and_hash_supported(0xcd, 0xab));
    Ok(())
}

#[test]
fn test_lookup_returns_adapter() -> Result<()> {
    let (registry, adapter) = xyz_registry()?;

    let by_code_point = registry.lookup_by_code_point(XYZ_SCHEME)?;
    let by_oid = registry.lookup_by_oid(&XYZ_OID)?;
    let by_name = registry.lookup_by_name(XYZ_NAME)?;
    for record in [by_code_point, by_oid, by_name] {
        assert!(same_adapter(record.adapter(), &adapter));
        assert_eq!(record.name(), XYZ_NAME);
        assert_eq!(record.oid(), &XYZ_OID);
        assert_eq!(record.code_point(), XYZ_SCHEME);
    }
    Ok(())
}

#[test]
fn test_lookup_not_found() -> Result<()> {
    let (registry, _) = xyz_registry()?;

    let err = registry.lookup_by_oid(&OTHER_OID).unwrap_err();
    assert!(matches!(err, Error::NotFound(Lookup::Oid(oid)) if oid == OTHER_OID));
    assert!(registry.lookup_by_code_point(OTHER_SCHEME).unwrap_err().is_not_found());
    assert!(registry.lookup_by_name("ABC-SIG").unwrap_err().is_not_found());
    Ok(())
}

#[rstest]
#[case::name(XYZ_NAME, OTHER_OID, OTHER_SCHEME)]
#[case::oid("ABC-SIG", XYZ_OID, OTHER_SCHEME)]
#[case::code_point("ABC-SIG", OTHER_OID, XYZ_SCHEME)]
fn test_register_rejects_collision(
    #[case] name: &str,
    #[case] oid: Oid,
    #[case] code_point: SignatureScheme,
) -> Result<()> {
    let (mut registry, adapter) = xyz_registry()?;

    let err = registry
        .register(name, oid, code_point, ToyAdapter::flat(oid))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateRegistration { .. }));

    // Nothing changed.
    assert_eq!(registry.len(), 1);
    assert!(same_adapter(registry.lookup_by_oid(&XYZ_OID)?.adapter(), &adapter));
    assert!(same_adapter(
        registry.lookup_by_code_point(XYZ_SCHEME)?.adapter(),
        &adapter
    ));
    Ok(())
}

#[test]
fn test_identifiers_stay_distinct() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut registry = AlgorithmRegistry::new();

    // Small identifier spaces, so collisions are frequent.
    for _ in 0..500 {
        let name = format!("ALG-{}", rng.gen_range(0..64));
        let oid = Oid::new(&format!("1.3.9999.{}", rng.gen_range(0..64)))?;
        let code_point = SignatureScheme::new(0xfe00 | rng.gen_range(0..64));
        let adapter = ToyAdapter::flat(oid);
        if rng.gen_bool(0.5) {
            let _ = registry.register(&name, oid, code_point, adapter);
        } else {
            let _ = registry.override_algorithm(&name, oid, code_point, adapter);
        }

        let records = registry.records();
        let names = records.iter().map(|r| r.name()).collect::<HashSet<_>>();
        let oids = records.iter().map(|r| *r.oid()).collect::<HashSet<_>>();
        let schemes = records.iter().map(|r| r.code_point()).collect::<HashSet<_>>();
        assert_eq!(names.len(), records.len());
        assert_eq!(oids.len(), records.len());
        assert_eq!(schemes.len(), records.len());

        for record in records {
            assert_eq!(registry.lookup_by_name(record.name())?.oid(), record.oid());
            assert_eq!(registry.lookup_by_oid(record.oid())?.name(), record.name());
            assert_eq!(
                registry.lookup_by_code_point(record.code_point())?.name(),
                record.name()
            );
        }
        assert_eq!(registry.dispatch().supported_schemes().len(), records.len());
    }
    Ok(())
}

#[test]
fn test_override_replaces_everywhere() -> Result<()> {
    let mut registry = AlgorithmRegistry::new();
    register_toy(&mut registry, "FIRST", "1.3.9999.1", 0xfe01)?;
    registry.register(XYZ_NAME, XYZ_OID, XYZ_SCHEME, ToyAdapter::flat(XYZ_OID))?;
    register_toy(&mut registry, "LAST", "1.3.9999.3", 0xfe03)?;

    // Same OID, new name and an unused code point.
    let replacement = ToyAdapter::nested(XYZ_OID);
    let scheme = SignatureScheme::new(0xfe02);
    let displaced = registry.override_algorithm("XYZ-SIG-2", XYZ_OID, scheme, replacement.clone());

    assert_eq!(displaced.len(), 1);
    assert_eq!(displaced[0].name(), XYZ_NAME);
    assert_eq!(registry.len(), 3);

    let names = registry.records().iter().map(|r| r.name()).collect::<Vec<_>>();
    assert_eq!(names, ["FIRST", "XYZ-SIG-2", "LAST"]);

    assert!(registry.lookup_by_name(XYZ_NAME).is_err());
    assert!(!registry.is_code_point_supported(XYZ_SCHEME));
    assert!(registry.dispatch().verifier(XYZ_SCHEME).is_err());
    assert!(same_adapter(registry.dispatch().verifier(scheme)?, &replacement));
    assert!(same_adapter(registry.lookup_by_oid(&XYZ_OID)?.adapter(), &replacement));
    assert!(same_adapter(registry.dispatch().signer("XYZ-SIG-2")?, &replacement));
    assert_eq!(
        registry.lookup_by_oid(&XYZ_OID)?.public_key_encoding(),
        Interpretation::Nested
    );
    Ok(())
}

#[test]
fn test_override_merges_collisions() -> Result<()> {
    let mut registry = AlgorithmRegistry::new();
    register_toy(&mut registry, "A", "1.3.9999.1", 0xfe01)?;
    register_toy(&mut registry, "B", "1.3.9999.2", 0xfe02)?;

    // Takes A's name and B's code point.
    let oid = Oid::new("1.3.9999.3")?;
    let scheme = SignatureScheme::new(0xfe02);
    let displaced = registry.override_algorithm("A", oid, scheme, ToyAdapter::flat(oid));
    assert_eq!(displaced.len(), 2);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.records()[0].oid(), &oid);
    assert!(!registry.is_oid_supported(&Oid::new("1.3.9999.1")?));
    assert!(!registry.is_oid_supported(&Oid::new("1.3.9999.2")?));
    Ok(())
}

#[test]
fn test_signature_and_hash_algorithms() -> Result<()> {
    let (mut registry, _) = xyz_registry()?;
    registry.register("ABC-SIG", OTHER_OID, OTHER_SCHEME, ToyAdapter::flat(OTHER_OID))?;

    let pairs = registry
        .signature_and_hash_algorithms()
        .into_iter()
        .map(|pair| (pair.hash, pair.signature))
        .collect::<Vec<_>>();
    assert_eq!(pairs, [(0xab, 0xcd), (0xfe, 0x01)]);
    assert_eq!(
        registry.dispatch().supported_schemes(),
        [XYZ_SCHEME, OTHER_SCHEME]
    );
    Ok(())
}

#[test]
fn test_public_key_round_trip() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    let (registry, adapter) = xyz_registry()?;
    let public = adapter.generate(&mut rng).public();

    assert!(registry.is_parameter_supported(&public));
    let spki = registry.create_subject_public_key_info(&public)?;
    assert_eq!(spki.oid(), &XYZ_OID);

    let decoded = registry.create_public_key_parameter(&spki, None)?;
    assert_eq!(decoded.downcast_ref::<ToyKey>(), Some(&public));
    Ok(())
}

#[test]
fn test_private_key_round_trip() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(2);
    let (registry, adapter) = xyz_registry()?;
    let private = adapter.generate(&mut rng);

    let mut values = SetOfVec::new();
    values.insert(Any::encode_from(&Utf8StringRef::new("toy")?)?)?;
    let mut attributes = SetOfVec::new();
    attributes.insert(Attribute {
        oid: Oid::new_unwrap("1.2.840.113549.1.9.20"),
        values,
    })?;

    let info = registry.create_private_key_info(&private, Some(&attributes))?;
    assert_eq!(info.attributes.as_ref(), Some(&attributes));

    let decoded = registry.create_private_key_parameter(&info)?;
    assert_eq!(decoded.downcast_ref::<ToyKey>(), Some(&private));
    Ok(())
}

#[test]
fn test_unregistered_key_info() -> Result<()> {
    let (registry, _) = xyz_registry()?;
    let spki = SubjectPublicKeyInfo::new(OTHER_OID, &[0x04, 0x00])?;

    let err = registry.create_public_key_parameter(&spki, None).unwrap_err();
    assert!(matches!(err, Error::NotFound(Lookup::Oid(oid)) if oid == OTHER_OID));
    Ok(())
}

#[test]
fn test_unsupported_parameter() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let (registry, _) = xyz_registry()?;
    let stranger = ToyAdapter::flat(OTHER_OID).generate(&mut rng);

    assert!(!registry.is_parameter_supported(&stranger));
    assert!(!registry.is_parameter_supported(&stranger.clone().untagged()));
    assert!(matches!(
        registry.create_subject_public_key_info(&stranger),
        Err(Error::UnsupportedParameter)
    ));
    assert!(matches!(
        registry.create_private_key_info(&stranger.untagged(), None),
        Err(Error::UnsupportedParameter)
    ));
    Ok(())
}

/// Wraps a [`ToyAdapter`], optionally claiming every key, and records the
/// default parameters passed on public key decoding.
#[derive(Debug)]
struct Instrumented {
    inner:       ToyAdapter,
    greedy:      bool,
    seen_params: Mutex<Vec<Option<u32>>>,
}

impl Instrumented {
    fn new(oid: Oid, greedy: bool) -> Self {
        Self {
            inner: ToyAdapter {
                oid,
                encoding: Interpretation::Flat,
            },
            greedy,
            seen_params: Mutex::default(),
        }
    }

    fn seen_params(&self) -> Vec<Option<u32>> {
        self.seen_params.lock().expect("lock poisoned").clone()
    }
}

impl AlgorithmAdapter for Instrumented {
    fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        self.inner.sign(message, private_key)
    }

    fn verify(&self, message: &[u8], public_key: &[u8], signature: &[u8]) -> Result<bool> {
        self.inner.verify(message, public_key, signature)
    }

    fn is_supported_parameter(&self, key: &dyn AsymmetricKey) -> bool {
        self.greedy || self.inner.is_supported_parameter(key)
    }

    fn public_key_encoding(&self) -> Interpretation {
        self.inner.public_key_encoding()
    }

    fn create_private_key_parameter(
        &self,
        key_info: &PrivateKeyInfo,
    ) -> Result<Box<dyn AsymmetricKey>> {
        self.inner.create_private_key_parameter(key_info)
    }

    fn create_public_key_parameter(
        &self,
        key_info: &SubjectPublicKeyInfo,
        default_params: Option<&dyn AnyParams>,
    ) -> Result<Box<dyn AsymmetricKey>> {
        let seen = default_params.and_then(|params| params.downcast_ref::<u32>().copied());
        self.seen_params.lock().expect("lock poisoned").push(seen);
        self.inner.create_public_key_parameter(key_info, default_params)
    }

    fn create_private_key_info(
        &self,
        key: &dyn AsymmetricKey,
        attributes: Option<&Attributes>,
    ) -> Result<PrivateKeyInfo> {
        self.inner.create_private_key_info(key, attributes)
    }

    fn create_subject_public_key_info(
        &self,
        key: &dyn AsymmetricKey,
    ) -> Result<SubjectPublicKeyInfo> {
        self.inner.create_subject_public_key_info(key)
    }
}

#[test]
fn test_probe_order() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(4);
    let greedy_oid = Oid::new("1.3.9999.1")?;
    let mut registry = AlgorithmRegistry::new();
    let greedy = Instrumented::new(greedy_oid, true);
    let scheme = SignatureScheme::new(0xfe01);
    registry.register("GREEDY", greedy_oid, scheme, Arc::new(greedy))?;
    registry.register(XYZ_NAME, XYZ_OID, XYZ_SCHEME, ToyAdapter::flat(XYZ_OID))?;
    let key = ToyAdapter::flat(XYZ_OID).generate(&mut rng);

    // Untagged keys go to the first adapter that claims them.
    let engine = registry.signature_engine(&key.clone().untagged())?;
    assert_eq!(engine.name(), "GREEDY");

    // Tagged keys go to their own algorithm.
    let engine = registry.signature_engine(&key)?;
    assert_eq!(engine.name(), XYZ_NAME);
    Ok(())
}

#[test]
fn test_default_params_reach_adapter() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(10);
    let adapter = Arc::new(Instrumented::new(XYZ_OID, false));
    let mut registry = AlgorithmRegistry::new();
    registry.register(XYZ_NAME, XYZ_OID, XYZ_SCHEME, adapter.clone())?;

    let public = ToyAdapter::flat(XYZ_OID).generate(&mut rng).public();
    let spki = registry.create_subject_public_key_info(&public)?;
    let hint: u32 = 44;
    registry.create_public_key_parameter(&spki, Some(&hint as &dyn AnyParams))?;
    registry.create_public_key_parameter(&spki, None)?;
    registry.create_public_key_parameter(&spki, Some(&"not a u32" as &dyn AnyParams))?;

    assert_eq!(adapter.seen_params(), [Some(44), None, None]);
    Ok(())
}

#[test]
fn test_parse_public_key() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let mut registry = AlgorithmRegistry::new();
    let nested = ToyAdapter::nested(XYZ_OID);
    registry.register(XYZ_NAME, XYZ_OID, XYZ_SCHEME, nested.clone())?;
    registry.register("ABC-SIG", OTHER_OID, OTHER_SCHEME, ToyAdapter::flat(OTHER_OID))?;

    let public = nested.generate(&mut rng).public();
    let spki = registry.create_subject_public_key_info(&public)?;
    let PublicKeyPayload::Nested(inner) = registry.parse_public_key(&spki)? else {
        panic!("expected a nested payload");
    };
    assert_eq!(inner.oid(), &WRAPPER_OID);
    assert_eq!(inner.key_octets()?, public.material.as_slice());

    // A flat payload under an OID declared as nested.
    let octets = OctetString::new(public.material.clone())?;
    let flat = SubjectPublicKeyInfo::from_value(XYZ_OID, &octets)?;
    assert!(matches!(
        registry.parse_public_key(&flat),
        Err(Error::InterpretationMismatch {
            expected: Interpretation::Nested,
            ..
        })
    ));

    let other = SubjectPublicKeyInfo::from_value(OTHER_OID, &Null)?;
    assert_eq!(
        registry.parse_public_key(&other)?.interpretation(),
        Interpretation::Flat
    );
    Ok(())
}

#[test]
fn test_dispatch_sign_verify() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(6);
    let (registry, adapter) = xyz_registry()?;
    let private = adapter.generate(&mut rng);
    let spki = registry.create_subject_public_key_info(&private.public())?;
    let message = b"CertificateVerify";

    let signature = registry.dispatch().sign(XYZ_NAME, message, &private.material)?;
    let dispatch = registry.dispatch();
    assert!(dispatch.verify(XYZ_SCHEME, message, spki.key_octets()?, &signature)?);
    assert!(!dispatch.verify(XYZ_SCHEME, b"tampered", spki.key_octets()?, &signature)?);
    assert!(dispatch
        .verify(OTHER_SCHEME, message, spki.key_octets()?, &signature)
        .unwrap_err()
        .is_not_found());
    Ok(())
}

#[test]
fn test_shared_between_threads() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let (registry, adapter) = xyz_registry()?;
    let registry = Arc::new(registry);
    let private = adapter.generate(&mut rng);

    let handles = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let private = private.clone();
            std::thread::spawn(move || -> Result<bool> {
                let message = format!("handshake {i}");
                let mut engine = registry.signature_engine(&private)?;
                engine.init_sign(&private)?;
                engine.update(message.as_bytes())?;
                let signature = engine.sign()?;

                let mut engine = registry.signature_engine(&private.public())?;
                engine.init_verify(&private.public())?;
                engine.update(message.as_bytes())?;
                Ok(engine.verify(&signature)?)
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert!(handle.join().expect("thread panicked")?);
    }
    Ok(())
}
