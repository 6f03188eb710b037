mod common;

#[cfg(test)]
mod extension_tests {
    use std::sync::Arc;

    use manifest_core::prelude::*;
    use manifest_core::validation::PathSegment;
    use serde_json::json;

    use super::common::*;

    #[test]
    fn shape_rejects_duplicates() {
        let base = || ExtensionShape::new().field::<u64>("isvsvn", -73).unwrap();

        assert_eq!(
            base().field::<u64>("isvsvn", -74).unwrap_err(),
            ExtensionError::DuplicateKey { key: "isvsvn".into() }
        );
        assert_eq!(
            base().field::<u64>("other", -73).unwrap_err(),
            ExtensionError::DuplicateSlot { slot: -73 }
        );
        assert_eq!(
            base().field_named::<u64>("other", -74, "isvsvn").unwrap_err(),
            ExtensionError::DuplicateName { name: "isvsvn".into() }
        );
    }

    #[test]
    fn shape_may_not_shadow_fixed_fields() {
        let by_slot = ExtensionShape::new().field::<u64>("x", 1).unwrap();
        assert!(matches!(
            ExtensionMap::new().with(ExtensionPoint::MVAL, by_slot),
            Err(ExtensionError::FixedFieldCollision { point: "mval", .. })
        ));

        let by_name = ExtensionShape::new().field_named::<u64>("x", -1, "version").unwrap();
        assert!(matches!(
            ExtensionMap::new().with(ExtensionPoint::MVAL, by_name),
            Err(ExtensionError::FixedFieldCollision { .. })
        ));

        // the same slot is free on another point
        let shape = ExtensionShape::new().field::<u64>("x", 8).unwrap();
        assert!(ExtensionMap::new().with(ExtensionPoint::ENTITY, shape).is_ok());
    }

    #[test]
    fn measurement_aliases_resolve_to_mval() {
        let map = ExtensionMap::new().with(ExtensionPoint::REFERENCE_VALUE, tdx_mval_shape()).unwrap();
        assert!(map.get(ExtensionPoint::MVAL).is_some());
        assert!(map.get(ExtensionPoint::ENDORSED_VALUE).is_some());
        assert_eq!(map.points().collect::<Vec<_>>(), [ExtensionPoint::MVAL]);

        // declaring the same shape again through the other alias is harmless
        let map = map.with(ExtensionPoint::ENDORSED_VALUE, tdx_mval_shape()).unwrap();
        assert_eq!(map.len(), 1);

        let other = ExtensionShape::new().field::<u64>("isvsvn", -73).unwrap();
        assert_eq!(
            map.with(ExtensionPoint::ENDORSED_VALUE, other).unwrap_err(),
            ExtensionError::DuplicatePoint { point: "mval" }
        );
    }

    #[test]
    fn unbound_set_is_an_always_miss() {
        let mut set = ExtensionSet::new();
        assert!(matches!(set.get("isvsvn"), Err(ExtensionError::NotFound { .. })));
        assert_eq!(set.set("isvsvn", 1u64).unwrap_err(), ExtensionError::NoShape { key: "isvsvn".into() });
        assert!(set.is_empty());
    }

    #[test]
    fn set_checks_key_and_type() {
        let mut set = ExtensionSet::bound(Arc::new(tdx_mval_shape()));

        assert_eq!(set.set("nope", 1u64).unwrap_err(), ExtensionError::UnknownKey { key: "nope".into() });
        assert!(matches!(
            set.set("isvsvn", "ten".to_string()),
            Err(ExtensionError::TypeMismatch { .. })
        ));

        set.set("isvsvn", 10u64).unwrap();
        assert_eq!(*set.get_as::<u64>("isvsvn").unwrap(), 10);
        assert!(matches!(set.get_as::<String>("isvsvn"), Err(ExtensionError::TypeMismatch { .. })));
        assert!(matches!(set.get_as::<u64>("isvprodid"), Err(ExtensionError::NotFound { .. })));

        let removed = set.delete("isvsvn").unwrap();
        assert_eq!(removed.to_json().unwrap(), json!(10));
        assert!(set.delete("isvsvn").is_none());
    }

    #[test]
    fn present_entries_are_validated() {
        let mut mval = Mval::new();
        mval.set_svn(Svn::Exact(1));
        mval.extensions.bind(Arc::new(tdx_mval_shape()));
        mval.extensions.set("pceid", String::new()).unwrap();

        let err = mval.validate().unwrap_err();
        assert_eq!(err.path(), [&PathSegment::Extension("pceid".into())]);

        mval.extensions.delete("pceid");
        assert!(mval.validate().is_ok());
    }

    #[test]
    fn extensions_alone_make_an_mval_non_empty() {
        let mut mval = Mval::new();
        mval.extensions.bind(Arc::new(tdx_mval_shape()));
        assert!(mval.validate().is_err());
        mval.extensions.set("isvprodid", 1u64).unwrap();
        assert!(mval.validate().is_ok());
    }

    #[test]
    fn rebinding_keeps_only_compatible_entries() {
        let mut set = ExtensionSet::bound(Arc::new(tdx_mval_shape()));
        set.set("isvsvn", 3u64).unwrap();
        set.set("pceid", "0000".to_string()).unwrap();

        let narrower = ExtensionShape::new()
            .field::<u64>("isvsvn", -73)
            .and_then(|s| s.field::<u64>("pceid", -80))
            .unwrap();
        set.bind(Arc::new(narrower));

        assert_eq!(set.keys().collect::<Vec<_>>(), ["isvsvn"]);
        assert_eq!(*set.get_as::<u64>("isvsvn").unwrap(), 3);
    }

    #[test]
    fn extensions_encode_after_fixed_fields_in_declaration_order() {
        let reg = Registry::with_builtins();
        let mut mval = tdx_mval();
        mval.extensions.set("isvprodid", 4u64).unwrap();
        mval.extensions.set("tcbdate", "2024-01-01T00:00:00Z".to_string()).unwrap();

        let bytes = reg.codec().to_json(&mval).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let names: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(names, ["svn", "tcbdate", "isvsvn", "pceid", "mrsigner", "isvprodid"]);
        assert_eq!(v["isvsvn"], json!(10));
    }

    #[test]
    fn decode_uses_the_codec_bindings() {
        let reg = registry_with_tdx();
        let profile = reg.get_profile(&tdx_profile_id()).unwrap();
        let mval = tdx_mval();

        let with_profile = reg.codec().with_profile(&profile);
        let bytes = with_profile.to_cbor(&mval).unwrap();
        let back: Mval = with_profile.from_cbor(&bytes).unwrap();
        assert_eq!(back, mval);
        assert_eq!(*back.extensions.get_as::<u64>("isvsvn").unwrap(), 10);
        assert_eq!(back.extensions.get_as::<Digests>("mrsigner").unwrap().len(), 1);

        // no bindings: the extension keys are unknown
        let plain: Mval = reg.codec().from_cbor(&bytes).unwrap();
        assert!(plain.extensions.is_empty());
        assert_eq!(plain.svn, Some(Svn::Exact(2)));
        assert!(reg.codec().strict(true).from_cbor::<Mval>(&bytes).is_err());
    }

    #[test]
    fn undecodable_extension_names_its_key() {
        let reg = registry_with_tdx();
        let profile = reg.get_profile(&tdx_profile_id()).unwrap();
        let data = br#"{"svn": {"type": "exact-value", "value": 1}, "isvsvn": "ten"}"#;

        let err = reg.codec().with_profile(&profile).from_json::<Mval>(data).unwrap_err();
        assert!(err.to_string().contains("extension isvsvn"), "got {err}");
    }

    #[test]
    fn process_bindings_apply_to_new_codecs() {
        let reg = Registry::with_builtins();
        let before = reg.codec();

        reg.bind(ExtensionPoint::ENTITY, ExtensionShape::new().field::<String>("email", -1).unwrap())
            .unwrap();

        let data = br#"{"name": "ACME", "roles": ["creator"], "email": "ops@acme.example"}"#;
        let entity: Entity = reg.codec().from_json(data).unwrap();
        assert_eq!(entity.extensions.get_as::<String>("email").unwrap(), "ops@acme.example");

        // a codec built earlier keeps its snapshot
        let entity: Entity = before.from_json(data).unwrap();
        assert!(entity.extensions.is_empty());
    }

    #[test]
    fn binding_over_a_fixed_field_is_refused() {
        let reg = Registry::with_builtins();
        let err = reg
            .bind(ExtensionPoint::ENTITY, ExtensionShape::new().field::<String>("roles", -1).unwrap())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Extension(ExtensionError::FixedFieldCollision { .. })));
    }
}
