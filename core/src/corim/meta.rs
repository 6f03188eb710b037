//! corim/meta.rs
//! Signer metadata and validity windows.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record};
use crate::constants::tags;
use crate::utils::is_absolute_uri;
use crate::validation::{validate_opt, Validate, ValidationError};

pub const SIGNER_FIELDS: &[FieldKey] = &[FieldKey::new(0, "name"), FieldKey::new(1, "uri")];
pub const VALIDITY_FIELDS: &[FieldKey] = &[FieldKey::new(0, "not-before"), FieldKey::new(1, "not-after")];
pub const META_FIELDS: &[FieldKey] = &[FieldKey::new(0, "signer"), FieldKey::new(1, "validity")];

fn time_to_cbor(t: &DateTime<Utc>) -> CborValue {
    binary::tagged(tags::EPOCH_TIME, CborValue::Integer(t.timestamp().into()))
}

fn time_from_cbor(value: CborValue) -> Result<DateTime<Utc>, DecodeError> {
    let secs = binary::expect_int(binary::expect_tag(value, tags::EPOCH_TIME)?)?;
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| DecodeError::InvalidValue(format!("epoch time {} out of range", secs)))
}

fn time_to_json(t: &DateTime<Utc>) -> JsonValue {
    JsonValue::String(t.to_rfc3339_opts(SecondsFormat::Secs, false))
}

fn time_from_json(value: JsonValue) -> Result<DateTime<Utc>, DecodeError> {
    let s = text::expect_str(value)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc).trunc_subsecs(0))
        .map_err(|e| DecodeError::InvalidValue(format!("{:?}: {}", s, e)))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Signer {
    pub name: Option<String>,
    pub uri: Option<String>,
}

impl Signer {
    pub fn new(name: &str) -> Self {
        Self { name: Some(name.to_string()), uri: None }
    }

    pub fn set_uri(&mut self, uri: &str) -> Result<&mut Self, ValidationError> {
        if !is_absolute_uri(uri) {
            return Err(ValidationError::invalid(format!("{:?} is not an absolute URI", uri)).at("uri"));
        }
        self.uri = Some(uri.to_string());
        Ok(self)
    }
}

impl Validate for Signer {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.name.as_deref() {
            None => return Err(ValidationError::missing("name")),
            Some("") => return Err(ValidationError::empty("name")),
            Some(_) => {}
        }
        match self.uri.as_deref() {
            Some("") => Err(ValidationError::empty("uri")),
            Some(uri) if !is_absolute_uri(uri) => {
                Err(ValidationError::invalid(format!("{:?} is not an absolute URI", uri)).at("uri"))
            }
            _ => Ok(()),
        }
    }
}

impl Record for Signer {
    const NAME: &'static str = "signer";
    const FIELDS: &'static [FieldKey] = SIGNER_FIELDS;

    fn encode_fields_cbor(&self, _cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        out.put_opt(0, self.name.as_deref().map(binary::text));
        out.put_opt(1, self.uri.as_deref().map(|u| binary::tagged(tags::URI, binary::text(u))));
        Ok(())
    }

    fn decode_field_cbor(&mut self, _cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.name = Some(binary::expect_text(value)?),
            1 => self.uri = Some(binary::expect_text(binary::expect_tag(value, tags::URI)?)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, _cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(n) = &self.name {
            out.insert("name".into(), JsonValue::String(n.clone()));
        }
        if let Some(u) = &self.uri {
            out.insert("uri".into(), JsonValue::String(u.clone()));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, _cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "name" => self.name = Some(text::expect_str(value)?),
            "uri" => self.uri = Some(text::expect_str(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

fn whole_seconds(t: &DateTime<Utc>) -> Result<(), ValidationError> {
    if t.timestamp_subsec_nanos() != 0 {
        return Err(ValidationError::invalid(format!("{} has a fractional second", t)));
    }
    Ok(())
}

/// Validity window. Times have one-second resolution on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validity {
    pub not_before: Option<DateTime<Utc>>,
    pub not_after: Option<DateTime<Utc>>,
}

impl Validity {
    /// Build a window; both times are truncated to whole seconds.
    pub fn new(not_before: Option<DateTime<Utc>>, not_after: DateTime<Utc>) -> Result<Self, ValidationError> {
        let v = Self {
            not_before: not_before.map(|t| t.trunc_subsecs(0)),
            not_after: Some(not_after.trunc_subsecs(0)),
        };
        v.validate()?;
        Ok(v)
    }

    /// Whether `at` falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.not_before.map_or(true, |nb| nb <= at) && self.not_after.map_or(false, |na| at <= na)
    }
}

impl Validate for Validity {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(not_after) = self.not_after else {
            return Err(ValidationError::missing("not-after"));
        };
        whole_seconds(&not_after).map_err(|e| e.at("not-after"))?;
        if let Some(not_before) = self.not_before {
            whole_seconds(&not_before).map_err(|e| e.at("not-before"))?;
            if not_before > not_after {
                return Err(ValidationError::invalid("not-before is later than not-after"));
            }
        }
        Ok(())
    }
}

impl Record for Validity {
    const NAME: &'static str = "validity";
    const FIELDS: &'static [FieldKey] = VALIDITY_FIELDS;

    fn encode_fields_cbor(&self, _cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        out.put_opt(0, self.not_before.as_ref().map(time_to_cbor));
        out.put_opt(1, self.not_after.as_ref().map(time_to_cbor));
        Ok(())
    }

    fn decode_field_cbor(&mut self, _cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.not_before = Some(time_from_cbor(value)?),
            1 => self.not_after = Some(time_from_cbor(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, _cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(t) = &self.not_before {
            out.insert("not-before".into(), time_to_json(t));
        }
        if let Some(t) = &self.not_after {
            out.insert("not-after".into(), time_to_json(t));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, _cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "not-before" => self.not_before = Some(time_from_json(value)?),
            "not-after" => self.not_after = Some(time_from_json(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

/// Metadata carried in the protected header of a signed CoRIM.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Meta {
    pub signer: Option<Signer>,
    pub validity: Option<Validity>,
}

impl Meta {
    pub fn new(signer: Signer) -> Self {
        Self { signer: Some(signer), validity: None }
    }

    pub fn set_validity(&mut self, validity: Validity) -> &mut Self {
        self.validity = Some(validity);
        self
    }
}

impl Validate for Meta {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(signer) = self.signer.as_ref() else {
            return Err(ValidationError::missing("signer"));
        };
        signer.validate().map_err(|e| e.at("signer"))?;
        validate_opt("validity", self.validity.as_ref())
    }
}

impl Record for Meta {
    const NAME: &'static str = "meta";
    const FIELDS: &'static [FieldKey] = META_FIELDS;

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(s) = &self.signer {
            out.put(0, cx.record_to_cbor(s)?);
        }
        if let Some(v) = &self.validity {
            out.put(1, cx.record_to_cbor(v)?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.signer = Some(cx.record_from_cbor(value)?),
            1 => self.validity = Some(cx.record_from_cbor(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(s) = &self.signer {
            out.insert("signer".into(), cx.record_to_json(s)?);
        }
        if let Some(v) = &self.validity {
            out.insert("validity".into(), cx.record_to_json(v)?);
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "signer" => self.signer = Some(cx.record_from_json(value)?),
            "validity" => self.validity = Some(cx.record_from_json(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}
