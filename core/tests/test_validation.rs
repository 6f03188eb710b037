mod common;

#[cfg(test)]
mod validation_tests {
    use manifest_core::prelude::*;
    use manifest_core::validation::{Cause, PathSegment};

    use super::common::*;

    #[test]
    fn reference_comid_is_valid() {
        assert!(test_comid().validate().is_ok());
    }

    #[test]
    fn missing_field_wins_over_child_errors() {
        // the entity is broken too, but the absent tag identity is reported
        let mut comid = test_comid();
        comid.tag_identity = None;
        comid.entities[0].roles = Default::default();

        let err = comid.validate().unwrap_err();
        assert_eq!(err.cause(), &Cause::MissingField("tag-identity"));
        assert!(err.path().is_empty());
    }

    #[test]
    fn empty_comid_reports_tag_identity_then_triples() {
        let mut comid = Comid::new();
        assert_eq!(comid.validate().unwrap_err().cause(), &Cause::MissingField("tag-identity"));

        comid.set_tag_identity(tag_id(), Some(1));
        assert_eq!(comid.validate().unwrap_err().cause(), &Cause::MissingField("triples"));
    }

    #[test]
    fn entity_checks_name_before_roles() {
        let entity = Entity::new();
        assert_eq!(entity.validate().unwrap_err().cause(), &Cause::MissingField("name"));

        let mut entity = Entity::new();
        entity.set_name("ACME").unwrap();
        assert_eq!(entity.validate().unwrap_err().cause(), &Cause::MissingField("roles"));
    }

    #[test]
    fn nested_failure_carries_its_path() {
        let mut comid = test_comid();
        comid.entities[0].reg_id = Some("intel.com".into());

        let err = comid.validate().unwrap_err();
        assert_eq!(
            err.path(),
            [&PathSegment::Index { list: "entities", index: 0 }, &PathSegment::Field("regid")]
        );
        assert!(err.to_string().starts_with("index 0 of entities: regid: "));
    }

    #[test]
    fn deep_failure_path() {
        let mut comid = test_comid();
        comid.triples.reference_values[0].measurements[0] = Measurement::new(Mval::new());

        let err = comid.validate().unwrap_err();
        assert_eq!(
            err.path(),
            [
                &PathSegment::Field("triples"),
                &PathSegment::Index { list: "reference-values", index: 0 },
                &PathSegment::Index { list: "measurements", index: 0 },
                &PathSegment::Field("value"),
            ]
        );
    }

    #[test]
    fn duplicate_roles_are_invalid() {
        let mut entity = intel_entity();
        entity.add_role(Role::Creator);
        let err = entity.validate().unwrap_err();
        assert_eq!(err.path(), [&PathSegment::Index { list: "roles", index: 3 }]);
    }

    #[test]
    fn present_but_empty_strings_are_invalid() {
        let mut comid = test_comid();
        comid.set_language("");
        assert_eq!(comid.validate().unwrap_err().cause(), &Cause::Empty("lang"));

        let mut class = seam_class();
        class.set_vendor("");
        let err = class.validate().unwrap_err();
        assert_eq!(err.cause(), &Cause::Empty("vendor"));
    }

    #[test]
    fn empty_class_and_triple_are_invalid() {
        assert!(Class::new().validate().is_err());
        assert_eq!(
            Environment::default().validate().unwrap_err().cause(),
            &Cause::MissingField("class")
        );

        let triple = ValueTriple::new(Environment::new(seam_class()), vec![]);
        assert_eq!(triple.validate().unwrap_err().cause(), &Cause::MissingField("measurements"));
    }

    #[test]
    fn digest_length_is_checked() {
        let mut digests = Digests::new();
        assert!(digests.add(HashAlg::Sha384, vec![0; 32]).is_err());
        digests.add(HashAlg::Sha384, vec![0; 48]).unwrap();
        assert!(Validate::validate(&digests).is_ok());
        assert!(Validate::validate(&Digests::new()).is_err());
    }

    #[test]
    fn invalid_uri_is_refused_at_the_setter() {
        let mut entity = Entity::new();
        assert!(entity.set_reg_id("not a uri").is_err());
        assert!(entity.reg_id.is_none());
    }

    #[test]
    fn decoding_does_not_validate() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        // an entity without roles decodes, then fails validation
        let entity: Entity = cx.from_json(br#"{"name": "ACME"}"#).unwrap();
        assert!(entity.validate().is_err());

        let err = cx.to_json(&entity).unwrap_err();
        assert!(matches!(err.root(), EncodingError::Invalid(e) if e.cause() == &Cause::MissingField("roles")));
    }

    #[test]
    fn errors_convert_into_manifest_error() {
        fn build() -> Result<Vec<u8>, ManifestError> {
            let reg = Registry::with_builtins();
            let mut entity = Entity::new();
            entity.set_name("ACME")?;
            Ok(reg.codec().to_cbor(&entity)?)
        }

        let err = build().unwrap_err();
        assert!(matches!(err, ManifestError::Encode(_)));
        assert!(err.is_data_error());
    }
}
