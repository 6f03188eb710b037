mod common;

#[cfg(test)]
mod corim_tests {
    use chrono::{TimeZone, Utc};
    use ciborium::value::Value as CborValue;
    use manifest_core::prelude::*;
    use manifest_core::validation::Cause;
    use serde_json::json;

    use super::common::*;

    fn corim() -> UnsignedCorim {
        let mut corim = UnsignedCorim::new();
        corim.set_id("corim-1").unwrap();
        corim.add_comid(test_comid());
        corim
    }

    fn validity() -> Validity {
        Validity::new(
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn tags_are_embedded_as_encoded_comids() {
        let reg = Registry::with_builtins();
        let data = reg.codec().to_cbor(&corim()).unwrap();

        let v: CborValue = ciborium::de::from_reader(&data[..]).unwrap();
        let CborValue::Map(entries) = v else { panic!("corim is not a map") };
        assert_eq!(entries[0].1, CborValue::Text("corim-1".into()));

        let CborValue::Array(tags) = &entries[1].1 else { panic!("tags is not an array") };
        let CborValue::Tag(506, inner) = &tags[0] else { panic!("tag is not a CoMID") };
        let CborValue::Bytes(comid) = inner.as_ref() else { panic!("CoMID is not a byte string") };
        assert_eq!(hex::encode(comid), GOLDEN_COMID);

        let back: UnsignedCorim = reg.codec().from_cbor(&data).unwrap();
        assert_eq!(back, corim());
    }

    #[test]
    fn text_tags_use_a_type_envelope() {
        let reg = Registry::with_builtins();
        let bytes = reg.codec().to_json(&corim()).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(v["corim-id"], json!("corim-1"));
        assert_eq!(v["tags"][0]["type"], json!("comid"));
        assert_eq!(v["tags"][0]["value"]["entities"][0]["name"], json!("INTEL"));

        let back: UnsignedCorim = reg.codec().from_json(&bytes).unwrap();
        assert_eq!(back, corim());
    }

    #[test]
    fn unsupported_tag_type_is_rejected() {
        let reg = Registry::with_builtins();
        let data = br#"{"corim-id": "c", "tags": [{"type": "coswid", "value": {}}]}"#;
        let err = reg.codec().from_json::<UnsignedCorim>(data).unwrap_err();
        assert!(err.to_string().contains("coswid"), "got {err}");
    }

    #[test]
    fn tagged_binary_form() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let data = corim().to_tagged_cbor(&cx).unwrap();
        assert_eq!(&data[..3], &[0xd9, 0x01, 0xf5]);
        assert_eq!(UnsignedCorim::from_tagged_cbor(&cx, &data).unwrap(), corim());

        let untagged = cx.to_cbor(&corim()).unwrap();
        assert!(UnsignedCorim::from_tagged_cbor(&cx, &untagged).is_err());
    }

    #[test]
    fn corim_mandatory_fields() {
        let mut corim = UnsignedCorim::new();
        assert_eq!(corim.validate().unwrap_err().cause(), &Cause::MissingField("corim-id"));
        corim.set_id("c").unwrap();
        assert_eq!(corim.validate().unwrap_err().cause(), &Cause::MissingField("tags"));
        assert!(corim.set_id("").is_err());
    }

    #[test]
    fn uuid_corim_id() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let mut corim = corim();
        let id = CorimId::new_in(reg.types(), "uuid", Some(Seed::from(TAG_UUID))).unwrap();
        corim.set_id_choice(id);

        let v: serde_json::Value = serde_json::from_slice(&cx.to_json(&corim).unwrap()).unwrap();
        assert_eq!(v["corim-id"]["type"], json!("uuid"));
        let back: UnsignedCorim = cx.from_cbor(&cx.to_cbor(&corim).unwrap()).unwrap();
        assert_eq!(back.id, corim.id);
    }

    #[test]
    fn rim_validity_and_entities() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let mut corim = corim();
        corim.set_rim_validity(validity()).add_entity(intel_entity());

        let v: serde_json::Value = serde_json::from_slice(&cx.to_json(&corim).unwrap()).unwrap();
        assert_eq!(
            v["rim-validity"],
            json!({"not-before": "2024-01-01T00:00:00+00:00", "not-after": "2025-01-01T00:00:00+00:00"})
        );

        let back: UnsignedCorim = cx.from_cbor(&cx.to_cbor(&corim).unwrap()).unwrap();
        assert_eq!(back, corim);
        let back: UnsignedCorim = cx.from_json(&cx.to_json(&corim).unwrap()).unwrap();
        assert_eq!(back, corim);
    }

    #[test]
    fn validity_window() {
        let window = validity();
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()));

        assert!(Validity::new(Some(window.not_after.unwrap()), window.not_before.unwrap()).is_err());
        assert_eq!(Validity::default().validate().unwrap_err().cause(), &Cause::MissingField("not-after"));
    }

    #[test]
    fn sub_second_times_agree_across_forms() {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let window = Validity::new(None, at + chrono::Duration::milliseconds(500)).unwrap();
        assert_eq!(window.not_after, Some(at));

        let from_bin: Validity = cx.from_cbor(&cx.to_cbor(&window).unwrap()).unwrap();
        let from_text: Validity = cx.from_json(&cx.to_json(&window).unwrap()).unwrap();
        assert_eq!(from_bin, window);
        assert_eq!(from_text, window);

        let parsed: Validity = cx.from_json(br#"{"not-after": "2025-01-01T00:00:00.750Z"}"#).unwrap();
        assert_eq!(parsed, window);

        // fields set directly are checked instead of silently truncated
        let raw = Validity { not_before: None, not_after: Some(at + chrono::Duration::milliseconds(1)) };
        assert!(raw.validate().is_err());
        assert!(cx.to_cbor(&raw).is_err());
    }

    #[test]
    fn validity_times_are_epoch_tagged() {
        let reg = Registry::with_builtins();
        let data = reg.codec().to_cbor(&validity()).unwrap();

        let v: CborValue = ciborium::de::from_reader(&data[..]).unwrap();
        let CborValue::Map(entries) = v else { panic!("validity is not a map") };
        assert_eq!(entries[1].1, CborValue::Tag(1, Box::new(CborValue::Integer(1_735_689_600_i64.into()))));
    }

    #[test]
    fn meta_round_trip() -> anyhow::Result<()> {
        let reg = Registry::with_builtins();
        let cx = reg.codec();

        let mut signer = Signer::new("ACME Ltd signing key");
        signer.set_uri("https://acme.example/keys/1")?;
        let mut meta = Meta::new(signer);
        meta.set_validity(validity());

        let back: Meta = cx.from_cbor(&cx.to_cbor(&meta)?)?;
        assert_eq!(back, meta);
        let back: Meta = cx.from_json(&cx.to_json(&meta)?)?;
        assert_eq!(back, meta);

        assert_eq!(Meta::default().validate().unwrap_err().cause(), &Cause::MissingField("signer"));
        assert!(Signer::new("x").set_uri("acme").is_err());
        Ok(())
    }

    #[test]
    fn bad_timestamp_is_a_decode_error() {
        let reg = Registry::with_builtins();
        let data = br#"{"not-after": "yesterday"}"#;
        let err = reg.codec().from_json::<Validity>(data).unwrap_err();
        assert!(matches!(err.root(), DecodeError::InvalidValue(_)), "got {err}");
    }
}
