#[cfg(test)]
mod choice_registry_tests {
    use std::fmt;

    use ciborium::value::Value as CborValue;
    use manifest_core::choice::{ChoiceError, OidValue, PlainText, ResolvedVariant};
    use manifest_core::codec::{binary, text};
    use manifest_core::prelude::*;
    use serde_json::{json, Value as JsonValue};

    /// Implementation id of a platform, as a profile might register it.
    #[derive(Clone, Debug, Default, PartialEq)]
    struct ImplId(Vec<u8>);

    impl ImplId {
        const TYPE_TAG: &'static str = "impl-id";
        const CBOR_TAG: u64 = 600;

        fn factory(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
            match seed {
                None => Ok(Box::new(ImplId::default())),
                Some(Seed::Bytes(b)) if b.len() == 32 => Ok(Box::new(ImplId(b))),
                Some(Seed::Bytes(_)) => {
                    Err(ChoiceError::InvalidSeed { type_tag: Self::TYPE_TAG, msg: "need 32 bytes".into() })
                }
                Some(other) => Err(ChoiceError::UnexpectedSeed { type_tag: Self::TYPE_TAG, seed: other.kind() }),
            }
        }
    }

    impl fmt::Display for ImplId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", hex::encode(&self.0))
        }
    }

    impl TypeChoiceValue for ImplId {
        fn type_tag(&self) -> &str {
            Self::TYPE_TAG
        }

        fn validate(&self) -> Result<(), ValidationError> {
            if self.0.len() != 32 {
                return Err(ValidationError::invalid("implementation id must be 32 bytes"));
            }
            Ok(())
        }

        fn to_cbor_payload(&self) -> Result<CborValue, EncodingError> {
            Ok(CborValue::Bytes(self.0.clone()))
        }

        fn set_cbor_payload(&mut self, payload: CborValue) -> Result<(), DecodeError> {
            self.0 = binary::expect_bytes(payload)?;
            Ok(())
        }

        fn to_json_payload(&self) -> Result<JsonValue, EncodingError> {
            Ok(JsonValue::String(hex::encode(&self.0)))
        }

        fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError> {
            let s = text::expect_str(payload)?;
            self.0 = hex::decode(&s).map_err(|e| DecodeError::InvalidValue(e.to_string()))?;
            Ok(())
        }
    }

    #[derive(Clone, Debug)]
    struct Impostor;

    impl fmt::Display for Impostor {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "impostor")
        }
    }

    impl TypeChoiceValue for Impostor {
        fn type_tag(&self) -> &str {
            "impostor"
        }
        fn validate(&self) -> Result<(), ValidationError> {
            Ok(())
        }
        fn to_cbor_payload(&self) -> Result<CborValue, EncodingError> {
            Ok(CborValue::Null)
        }
        fn set_cbor_payload(&mut self, _: CborValue) -> Result<(), DecodeError> {
            Ok(())
        }
        fn to_json_payload(&self) -> Result<JsonValue, EncodingError> {
            Ok(JsonValue::Null)
        }
        fn set_json_payload(&mut self, _: JsonValue) -> Result<(), DecodeError> {
            Ok(())
        }
    }

    fn impostor_factory(_: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        Ok(Box::new(Impostor))
    }

    fn broken_factory(_: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        Err(ChoiceError::InvalidSeed { type_tag: "broken", msg: "no zero value".into() })
    }

    fn oid_factory_again(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        OidValue::factory(seed)
    }

    #[test]
    fn builtins_resolve_both_ways() {
        let reg = Registry::with_builtins();
        let types = reg.types();

        let ResolvedVariant { type_tag, .. } =
            types.resolve_by_discriminator(Family::CLASS_ID, Discriminator::Tag(111)).unwrap();
        assert_eq!(type_tag, "oid");
        assert_eq!(
            types.resolve_by_type_tag(Family::CLASS_ID, "uuid").unwrap().discriminator,
            Discriminator::Tag(37)
        );
        assert_eq!(
            types.resolve_by_discriminator(Family::ENTITY_NAME, Discriminator::BareText).unwrap().type_tag,
            "string"
        );
        assert_eq!(types.type_tags(Family::TAG_ID), ["string", "uuid"]);
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let reg = Registry::new();
        assert!(reg.types().type_tags(Family::ENTITY_NAME).is_empty());
        assert!(matches!(
            reg.types().resolve_by_type_tag(Family::ENTITY_NAME, "string"),
            Err(ChoiceError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn registration_reports_the_probed_type_tag() {
        let reg = Registry::with_builtins();
        let tag = reg
            .register_type(Family::CLASS_ID, Discriminator::Tag(ImplId::CBOR_TAG), ImplId::factory)
            .unwrap();
        assert_eq!(tag, ImplId::TYPE_TAG);
        assert_eq!(reg.types().type_tags(Family::CLASS_ID), ["bytes", "impl-id", "oid", "uuid"]);
    }

    #[test]
    fn registered_variant_round_trips() {
        let reg = Registry::with_builtins();
        reg.register_type(Family::CLASS_ID, Discriminator::Tag(ImplId::CBOR_TAG), ImplId::factory)
            .unwrap();
        let cx = reg.codec();

        let id = ClassId::new_in(reg.types(), ImplId::TYPE_TAG, Some(Seed::Bytes(vec![0x61; 32]))).unwrap();
        let mut class = Class::new();
        class.set_class_id(id);

        let bin: CborValue = ciborium::de::from_reader(&cx.to_cbor(&class).unwrap()[..]).unwrap();
        let CborValue::Map(entries) = bin else { panic!("class is not a map") };
        assert!(matches!(&entries[0].1, CborValue::Tag(600, _)));

        let text: JsonValue = serde_json::from_slice(&cx.to_json(&class).unwrap()).unwrap();
        assert_eq!(text["id"], json!({"type": "impl-id", "value": "61".repeat(32)}));

        let back: Class = cx.from_cbor(&cx.to_cbor(&class).unwrap()).unwrap();
        assert_eq!(back.class_id.as_ref().unwrap().downcast_ref::<ImplId>(), Some(&ImplId(vec![0x61; 32])));
        let back: Class = cx.from_json(&cx.to_json(&class).unwrap()).unwrap();
        assert_eq!(back, class);
    }

    #[test]
    fn variant_unknown_to_the_decoding_registry() {
        let producer = Registry::with_builtins();
        producer
            .register_type(Family::CLASS_ID, Discriminator::Tag(ImplId::CBOR_TAG), ImplId::factory)
            .unwrap();
        let mut class = Class::new();
        class.set_class_id(ClassId::new_in(producer.types(), "impl-id", Some(Seed::Bytes(vec![1; 32]))).unwrap());
        let data = producer.codec().to_cbor(&class).unwrap();

        let consumer = Registry::with_builtins();
        let err = consumer.codec().from_cbor::<Class>(&data).unwrap_err();
        assert!(matches!(err.root(), DecodeError::UnknownVariant { discriminator, .. } if discriminator == "tag 600"));

        // nor can it encode one
        let err = consumer.codec().to_cbor(&class).unwrap_err();
        assert!(matches!(err.root(), EncodingError::UnregisteredVariant { .. }));
    }

    #[test]
    fn duplicate_type_tag_is_rejected() {
        let reg = Registry::with_builtins();
        let err = reg
            .register_type(Family::CLASS_ID, Discriminator::Tag(999), oid_factory_again)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateTypeTag { ref type_tag, .. } if type_tag == "oid"));
        assert!(reg.types().resolve_by_discriminator(Family::CLASS_ID, Discriminator::Tag(999)).is_err());
    }

    #[test]
    fn duplicate_discriminator_is_rejected() {
        let reg = Registry::with_builtins();
        let before = reg.types().type_tags(Family::CLASS_ID);

        let err = reg
            .register_type(Family::CLASS_ID, Discriminator::Tag(111), impostor_factory)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateDiscriminator { .. }));
        assert_eq!(reg.types().type_tags(Family::CLASS_ID), before);

        let err = reg
            .register_type(Family::ENTITY_NAME, Discriminator::BareText, impostor_factory)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateDiscriminator { .. }));
    }

    #[test]
    fn failed_probe_is_reported() {
        let reg = Registry::with_builtins();
        let err = reg
            .register_type(Family::new("broken-family"), Discriminator::Tag(1000), broken_factory)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::ProbeFailed { .. }));
        assert!(reg.types().type_tags(Family::new("broken-family")).is_empty());
    }

    #[test]
    fn new_families_can_be_opened() {
        let reg = Registry::new();
        let family = Family::new("platform-id");
        reg.register_type(family, Discriminator::Tag(ImplId::CBOR_TAG), ImplId::factory).unwrap();
        assert_eq!(reg.types().type_tags(family), ["impl-id"]);
    }

    #[test]
    fn sealed_registry_refuses_types() {
        let reg = Registry::with_builtins();
        let before = reg.types().type_tags(Family::CLASS_ID);
        reg.seal();
        assert!(reg.is_sealed());
        let err = reg
            .register_type(Family::CLASS_ID, Discriminator::Tag(ImplId::CBOR_TAG), ImplId::factory)
            .unwrap_err();
        assert!(matches!(err, RegistrationError::Sealed { .. }));

        // registration is only reachable through the root registry
        let family = Family::new("late-family");
        assert!(reg.register_type(family, Discriminator::Tag(99999), OidValue::factory).is_err());
        assert!(reg.types().type_tags(family).is_empty());
        assert_eq!(reg.types().type_tags(Family::CLASS_ID), before);
    }

    #[test]
    fn oids_are_kept_in_canonical_form() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let id = ClassId::new_in(reg.types(), "oid", Some(Seed::from("2.16.0840.1.113741"))).unwrap();
        assert_eq!(id.to_string(), "2.16.840.1.113741");

        let mut class = Class::new();
        class.set_class_id(id);
        let back: Class = cx.from_cbor(&cx.to_cbor(&class).unwrap()).unwrap();
        assert_eq!(back, class);
        let back: Class = cx.from_json(br#"{"id": {"type": "oid", "value": "2.16.840.01.113741"}}"#).unwrap();
        assert_eq!(back, class);
    }

    #[test]
    fn non_minimal_oid_encoding_is_rejected() {
        let reg = Registry::with_builtins();
        let ber = CborValue::Bytes(vec![0x60, 0x80, 0x86, 0x48]);
        let class = CborValue::Map(vec![(CborValue::Integer(0.into()), CborValue::Tag(111, Box::new(ber)))]);
        let mut data = Vec::new();
        ciborium::ser::into_writer(&class, &mut data).unwrap();

        let err = reg.codec().from_cbor::<Class>(&data).unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidValue(msg) if msg.contains("non-minimal")), "got {err}");
    }

    #[test]
    fn factory_seeds() {
        let reg = Registry::with_builtins();
        let types = reg.types();

        assert!(matches!(
            ClassId::new_in(types, "nope", None),
            Err(ChoiceError::UnknownVariant { .. })
        ));
        assert!(matches!(
            ClassId::new_in(types, "oid", Some(Seed::Uint(5))),
            Err(ChoiceError::UnexpectedSeed { .. })
        ));
        assert!(matches!(
            ClassId::new_in(types, "oid", Some(Seed::from("not.an.oid"))),
            Err(ChoiceError::InvalidSeed { .. })
        ));

        let uuid = TagId::new_in(types, "uuid", Some(Seed::from("43bbe37f-2e61-4b33-aed3-53cff1428b20"))).unwrap();
        assert_eq!(uuid.to_string(), "43bbe37f-2e61-4b33-aed3-53cff1428b20");

        let zero = TagId::new_in(types, "string", None).unwrap();
        assert!(zero.downcast_ref::<PlainText>().is_some());
        assert!(zero.validate().is_err());
    }

    #[test]
    fn plain_rejects_empty_text() {
        assert!(EntityName::plain("").is_err());
        assert_eq!(EntityName::plain("ACME").unwrap().type_tag(), "string");
    }

    #[test]
    #[should_panic]
    fn asserted_constructor_panics_on_bad_literal() {
        let reg = Registry::with_builtins();
        let _ = ClassId::new_asserted(reg.types(), "oid", Some(Seed::from("x")));
    }
}
