//! codec/record.rs
//! Contracts between concrete schemas and the codec.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::codec::binary::CborMap;
use crate::codec::context::Codec;
use crate::codec::text::JsonMap;
use crate::codec::types::{DecodeError, EncodingError};
use crate::extensions::{ExtensionPoint, ExtensionSet};
use crate::profile::ProfileId;
use crate::validation::Validate;

/// Wire keys of one fixed field: binary map key and text member name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldKey {
    pub cbor: i64,
    pub json: &'static str,
}

impl FieldKey {
    pub const fn new(cbor: i64, json: &'static str) -> Self {
        Self { cbor, json }
    }
}

/// A map-encoded schema record.
///
/// Implementors encode and decode their own fixed fields; the codec drives
/// the map, duplicate detection, extension fields and unknown keys.
pub trait Record: Validate + Default + Sized {
    const NAME: &'static str;
    const FIELDS: &'static [FieldKey];
    const EXTENSION_POINT: Option<ExtensionPoint> = None;

    fn extensions(&self) -> Option<&ExtensionSet> {
        None
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        None
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError>;

    /// Decode the fixed field at `key`, one of `FIELDS`.
    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError>;

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError>;

    /// Decode the fixed field named `name`, one of `FIELDS`.
    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError>;

    /// Profile this record declares for its own subtree, read from the raw
    /// binary map before any field is decoded.
    fn profile_hint_cbor(_entries: &[(CborValue, CborValue)]) -> Option<ProfileId> {
        None
    }

    fn profile_hint_json(_members: &JsonMap) -> Option<ProfileId> {
        None
    }
}

/// Non-record values that travel inside record fields.
pub trait WireValue: Sized {
    fn to_cbor(&self, cx: &Codec<'_>) -> Result<CborValue, EncodingError>;
    fn from_cbor(cx: &Codec<'_>, value: CborValue) -> Result<Self, DecodeError>;
    fn to_json(&self, cx: &Codec<'_>) -> Result<JsonValue, EncodingError>;
    fn from_json(cx: &Codec<'_>, value: JsonValue) -> Result<Self, DecodeError>;
}

/// Error for a key a record's field decoder was not declared for.
pub fn not_a_field(record: &'static str, key: impl std::fmt::Display) -> DecodeError {
    DecodeError::UnknownField { record, key: key.to_string() }
}
