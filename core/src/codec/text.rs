//! codec/text.rs
//! JSON primitives for the text wire form.
//!
//! Design notes:
//! - Records are objects keyed by lower-case hyphenated names; absent
//!   optional fields are omitted.
//! - Type-choice values that are not the plain string variant travel in a
//!   two-member `{"type": ..., "value": ...}` envelope.

use serde_json::{Map, Value as JsonValue};

use crate::codec::types::{DecodeError, EncodingError, WireFormat};
use crate::constants::{ENVELOPE_TYPE, ENVELOPE_VALUE};

pub type JsonMap = Map<String, JsonValue>;

/// Decoded `{"type", "value"}` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAndValue {
    pub type_tag: String,
    pub value: JsonValue,
}

impl TypeAndValue {
    pub fn into_json(self) -> JsonValue {
        let mut m = JsonMap::new();
        m.insert(ENVELOPE_TYPE.to_string(), JsonValue::String(self.type_tag));
        m.insert(ENVELOPE_VALUE.to_string(), self.value);
        JsonValue::Object(m)
    }

    pub fn from_json(v: JsonValue) -> Result<Self, DecodeError> {
        let mut obj = expect_object(v)?;
        let type_tag = obj
            .remove(ENVELOPE_TYPE)
            .ok_or_else(|| DecodeError::InvalidValue("envelope without \"type\"".into()))
            .and_then(expect_str)?;
        let value = obj
            .remove(ENVELOPE_VALUE)
            .ok_or_else(|| DecodeError::InvalidValue("envelope without \"value\"".into()))?;
        if let Some(extra) = obj.keys().next() {
            return Err(DecodeError::InvalidValue(format!("unexpected envelope member {:?}", extra)));
        }
        Ok(Self { type_tag, value })
    }
}

pub fn to_bytes(value: &JsonValue) -> Result<Vec<u8>, EncodingError> {
    serde_json::to_vec(value).map_err(|e| EncodingError::Serialize {
        format: WireFormat::Text,
        msg: e.to_string(),
    })
}

pub fn from_bytes(data: &[u8]) -> Result<JsonValue, DecodeError> {
    serde_json::from_slice(data).map_err(|e| DecodeError::Malformed {
        format: WireFormat::Text,
        msg: e.to_string(),
    })
}

pub fn expect_str(v: JsonValue) -> Result<String, DecodeError> {
    match v {
        JsonValue::String(s) => Ok(s),
        other => Err(DecodeError::unexpected("string", other)),
    }
}

pub fn expect_u64(v: JsonValue) -> Result<u64, DecodeError> {
    match v {
        JsonValue::Number(n) => n
            .as_u64()
            .ok_or_else(|| DecodeError::InvalidValue(format!("{} is not an unsigned integer", n))),
        other => Err(DecodeError::unexpected("unsigned integer", other)),
    }
}

pub fn expect_i64(v: JsonValue) -> Result<i64, DecodeError> {
    match v {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| DecodeError::InvalidValue(format!("{} is not an integer", n))),
        other => Err(DecodeError::unexpected("integer", other)),
    }
}

pub fn expect_array(v: JsonValue) -> Result<Vec<JsonValue>, DecodeError> {
    match v {
        JsonValue::Array(items) => Ok(items),
        other => Err(DecodeError::unexpected("array", other)),
    }
}

pub fn expect_object(v: JsonValue) -> Result<JsonMap, DecodeError> {
    match v {
        JsonValue::Object(m) => Ok(m),
        other => Err(DecodeError::unexpected("object", other)),
    }
}

pub fn decode_list<T>(
    v: JsonValue,
    mut f: impl FnMut(JsonValue) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    expect_array(v)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| f(item).map_err(|e| e.at_index(i)))
        .collect()
}

pub fn encode_list<T>(
    items: &[T],
    mut f: impl FnMut(&T) -> Result<JsonValue, EncodingError>,
) -> Result<JsonValue, EncodingError> {
    items.iter().map(&mut f).collect::<Result<Vec<_>, _>>().map(JsonValue::Array)
}
