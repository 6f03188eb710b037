//! comid/measurement.rs
//! Measurements and measurement values.

use ciborium::value::Value as CborValue;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_json::Value as JsonValue;

use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap, TypeAndValue};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record};
use crate::comid::digest::Digests;
use crate::constants::tags;
use crate::extensions::{bind_record, Extensible, ExtensionDecode, ExtensionMap, ExtensionPoint, ExtensionSet, ExtensionValue};
use crate::validation::{non_empty_opt, validate_opt, Validate, ValidationError};

pub const VERSION_FIELDS: &[FieldKey] = &[FieldKey::new(0, "value"), FieldKey::new(1, "scheme")];

pub const MVAL_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "version"),
    FieldKey::new(1, "svn"),
    FieldKey::new(2, "digests"),
    FieldKey::new(8, "serial-number"),
    FieldKey::new(11, "name"),
];

pub const MEASUREMENT_FIELDS: &[FieldKey] = &[FieldKey::new(1, "value")];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum VersionScheme {
    MultipartNumeric = 1,
    MultipartNumericSuffix = 2,
    AlphaNumeric = 3,
    Decimal = 4,
    Semver = 16384,
}

impl VersionScheme {
    pub fn name(&self) -> &'static str {
        match self {
            VersionScheme::MultipartNumeric => "multipartnumeric",
            VersionScheme::MultipartNumericSuffix => "multipartnumeric+suffix",
            VersionScheme::AlphaNumeric => "alphanumeric",
            VersionScheme::Decimal => "decimal",
            VersionScheme::Semver => "semver",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "multipartnumeric" => Some(VersionScheme::MultipartNumeric),
            "multipartnumeric+suffix" => Some(VersionScheme::MultipartNumericSuffix),
            "alphanumeric" => Some(VersionScheme::AlphaNumeric),
            "decimal" => Some(VersionScheme::Decimal),
            "semver" => Some(VersionScheme::Semver),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Version {
    pub value: Option<String>,
    pub scheme: Option<VersionScheme>,
}

impl Version {
    pub fn new(value: &str, scheme: VersionScheme) -> Self {
        Self { value: Some(value.to_string()), scheme: Some(scheme) }
    }
}

impl Validate for Version {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.value.as_deref() {
            None => Err(ValidationError::missing("value")),
            Some("") => Err(ValidationError::empty("value")),
            Some(_) => Ok(()),
        }
    }
}

impl Record for Version {
    const NAME: &'static str = "version";
    const FIELDS: &'static [FieldKey] = VERSION_FIELDS;

    fn encode_fields_cbor(&self, _cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        out.put_opt(0, self.value.as_deref().map(binary::text));
        out.put_opt(1, self.scheme.map(|s| binary::uint(s.into())));
        Ok(())
    }

    fn decode_field_cbor(&mut self, _cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.value = Some(binary::expect_text(value)?),
            1 => {
                let n = binary::expect_uint(value)?;
                let scheme = VersionScheme::try_from(n)
                    .map_err(|_| DecodeError::InvalidValue(format!("unknown version scheme {}", n)))?;
                self.scheme = Some(scheme);
            }
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, _cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(v) = &self.value {
            out.insert("value".into(), JsonValue::String(v.clone()));
        }
        if let Some(s) = self.scheme {
            out.insert("scheme".into(), JsonValue::String(s.name().into()));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, _cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "value" => self.value = Some(text::expect_str(value)?),
            "scheme" => {
                let s = text::expect_str(value)?;
                let scheme = VersionScheme::from_name(&s)
                    .ok_or_else(|| DecodeError::InvalidValue(format!("unknown version scheme {:?}", s)))?;
                self.scheme = Some(scheme);
            }
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

/// Security version number: an exact value or a lower bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Svn {
    Exact(u64),
    Min(u64),
}

impl Svn {
    const EXACT: &'static str = "exact-value";
    const MIN: &'static str = "min-value";

    pub fn to_cbor(&self) -> CborValue {
        match self {
            Svn::Exact(n) => binary::tagged(tags::SVN_EXACT, binary::uint(*n)),
            Svn::Min(n) => binary::tagged(tags::SVN_MIN, binary::uint(*n)),
        }
    }

    /// A bare unsigned integer is an exact value.
    pub fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        match value {
            v @ CborValue::Integer(_) => binary::expect_uint(v).map(Svn::Exact),
            CborValue::Tag(tags::SVN_EXACT, inner) => binary::expect_uint(*inner).map(Svn::Exact),
            CborValue::Tag(tags::SVN_MIN, inner) => binary::expect_uint(*inner).map(Svn::Min),
            other => Err(DecodeError::unexpected("svn", other)),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let (type_tag, n) = match self {
            Svn::Exact(n) => (Self::EXACT, *n),
            Svn::Min(n) => (Self::MIN, *n),
        };
        TypeAndValue { type_tag: type_tag.into(), value: JsonValue::from(n) }.into_json()
    }

    pub fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        let tv = TypeAndValue::from_json(value)?;
        let n = text::expect_u64(tv.value)?;
        match tv.type_tag.as_str() {
            Self::EXACT => Ok(Svn::Exact(n)),
            Self::MIN => Ok(Svn::Min(n)),
            other => Err(DecodeError::InvalidValue(format!("unknown svn type {:?}", other))),
        }
    }
}

/// Measurement value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mval {
    pub version: Option<Version>,
    pub svn: Option<Svn>,
    pub digests: Option<Digests>,
    pub serial_number: Option<String>,
    pub name: Option<String>,
    pub extensions: ExtensionSet,
}

impl Mval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_version(&mut self, value: &str, scheme: VersionScheme) -> &mut Self {
        self.version = Some(Version::new(value, scheme));
        self
    }

    pub fn set_svn(&mut self, svn: Svn) -> &mut Self {
        self.svn = Some(svn);
        self
    }

    pub fn set_digests(&mut self, digests: Digests) -> &mut Self {
        self.digests = Some(digests);
        self
    }

    pub fn set_serial_number(&mut self, serial: &str) -> &mut Self {
        self.serial_number = Some(serial.to_string());
        self
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    fn has_fixed_field(&self) -> bool {
        self.version.is_some()
            || self.svn.is_some()
            || self.digests.is_some()
            || self.serial_number.is_some()
            || self.name.is_some()
    }
}

impl Validate for Mval {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_fixed_field() && self.extensions.is_empty() {
            return Err(ValidationError::invalid("no measurement value set"));
        }
        validate_opt("version", self.version.as_ref())?;
        validate_opt("digests", self.digests.as_ref())?;
        non_empty_opt("serial-number", self.serial_number.as_deref())?;
        non_empty_opt("name", self.name.as_deref())?;
        self.extensions.validate()
    }
}

impl Record for Mval {
    const NAME: &'static str = "measurement value";
    const FIELDS: &'static [FieldKey] = MVAL_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::MVAL);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(v) = &self.version {
            out.put(0, cx.record_to_cbor(v)?);
        }
        out.put_opt(1, self.svn.as_ref().map(Svn::to_cbor));
        if let Some(d) = &self.digests {
            out.put(2, d.to_cbor()?);
        }
        out.put_opt(8, self.serial_number.as_deref().map(binary::text));
        out.put_opt(11, self.name.as_deref().map(binary::text));
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.version = Some(cx.record_from_cbor(value)?),
            1 => self.svn = Some(Svn::from_cbor(value)?),
            2 => self.digests = Some(Digests::from_cbor(value)?),
            8 => self.serial_number = Some(binary::expect_text(value)?),
            11 => self.name = Some(binary::expect_text(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(v) = &self.version {
            out.insert("version".into(), cx.record_to_json(v)?);
        }
        if let Some(svn) = &self.svn {
            out.insert("svn".into(), svn.to_json());
        }
        if let Some(d) = &self.digests {
            out.insert("digests".into(), d.to_json()?);
        }
        if let Some(s) = &self.serial_number {
            out.insert("serial-number".into(), JsonValue::String(s.clone()));
        }
        if let Some(n) = &self.name {
            out.insert("name".into(), JsonValue::String(n.clone()));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "version" => self.version = Some(cx.record_from_json(value)?),
            "svn" => self.svn = Some(Svn::from_json(value)?),
            "digests" => self.digests = Some(Digests::from_json(value)?),
            "serial-number" => self.serial_number = Some(text::expect_str(value)?),
            "name" => self.name = Some(text::expect_str(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Mval {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Measurement {
    pub value: Option<Mval>,
}

impl Measurement {
    pub fn new(value: Mval) -> Self {
        Self { value: Some(value) }
    }
}

impl Validate for Measurement {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(value) = self.value.as_ref() else {
            return Err(ValidationError::missing("value"));
        };
        value.validate().map_err(|e| e.at("value"))
    }
}

impl Record for Measurement {
    const NAME: &'static str = "measurement";
    const FIELDS: &'static [FieldKey] = MEASUREMENT_FIELDS;

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(v) = &self.value {
            out.put(1, cx.record_to_cbor(v)?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            1 => self.value = Some(cx.record_from_cbor(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(v) = &self.value {
            out.insert("value".into(), cx.record_to_json(v)?);
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "value" => self.value = Some(cx.record_from_json(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Measurement {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        if let Some(v) = self.value.as_mut() {
            v.bind_extensions(map);
        }
    }
}
