//! extensions/values.rs
//! Extension value impls for scalar types.

use ciborium::value::{Integer, Value as CborValue};
use serde_json::Value as JsonValue;

use crate::codec::{binary, text, DecodeError, EncodingError};
use crate::extensions::types::{ExtensionDecode, ExtensionValue};
use crate::utils::{b64_decode, b64_encode};

impl ExtensionValue for u64 {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        Ok(binary::uint(*self))
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::from(*self))
    }
}

impl ExtensionDecode for u64 {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::expect_uint(value)
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        text::expect_u64(value)
    }
}

impl ExtensionValue for i64 {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Integer(Integer::from(*self)))
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::from(*self))
    }
}

impl ExtensionDecode for i64 {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::expect_int(value)
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        text::expect_i64(value)
    }
}

impl ExtensionValue for bool {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Bool(*self))
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::Bool(*self))
    }
}

impl ExtensionDecode for bool {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        match value {
            CborValue::Bool(b) => Ok(b),
            other => Err(DecodeError::unexpected("bool", other)),
        }
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        match value {
            JsonValue::Bool(b) => Ok(b),
            other => Err(DecodeError::unexpected("bool", other)),
        }
    }
}

/// Text extension; an empty string is present but invalid.
impl ExtensionValue for String {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Text(self.clone()))
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::String(self.clone()))
    }

    fn validate(&self) -> Result<(), crate::validation::ValidationError> {
        if self.is_empty() {
            return Err(crate::validation::ValidationError::empty("string"));
        }
        Ok(())
    }
}

impl ExtensionDecode for String {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::expect_text(value)
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        text::expect_str(value)
    }
}

/// Opaque bytes; base64 in the text form.
impl ExtensionValue for Vec<u8> {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Bytes(self.clone()))
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::String(b64_encode(self)))
    }
}

impl ExtensionDecode for Vec<u8> {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::expect_bytes(value)
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        let s = text::expect_str(value)?;
        b64_decode(&s).map_err(DecodeError::InvalidValue)
    }
}
