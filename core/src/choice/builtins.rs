//! choice/builtins.rs
//! Variants of the base schema: plain text, OID, UUID and opaque bytes.

use std::fmt;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::choice::types::{ChoiceError, Seed, TypeChoiceValue};
use crate::codec::{binary, text, DecodeError, EncodingError};
use crate::constants::type_tags;
use crate::utils::{b64_decode, b64_encode, oid_canonical, oid_from_ber, oid_to_ber};
use crate::validation::ValidationError;

/// The designated "plain string" variant. Encoded as a bare text item in both
/// wire forms.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainText(pub String);

impl PlainText {
    pub fn factory(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        let text = match seed {
            None => String::new(),
            Some(Seed::Text(s)) => s,
            Some(Seed::Bytes(b)) => String::from_utf8(b).map_err(|_| ChoiceError::InvalidSeed {
                type_tag: type_tags::STRING,
                msg: "bytes do not form a valid UTF-8 string".into(),
            })?,
            Some(other) => {
                return Err(ChoiceError::UnexpectedSeed { type_tag: type_tags::STRING, seed: other.kind() })
            }
        };
        Ok(Box::new(PlainText(text)))
    }
}

impl fmt::Display for PlainText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TypeChoiceValue for PlainText {
    fn type_tag(&self) -> &str {
        type_tags::STRING
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::empty("string"));
        }
        Ok(())
    }

    fn to_cbor_payload(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Text(self.0.clone()))
    }

    fn set_cbor_payload(&mut self, payload: CborValue) -> Result<(), DecodeError> {
        self.0 = binary::expect_text(payload)?;
        Ok(())
    }

    fn to_json_payload(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::String(self.0.clone()))
    }

    fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError> {
        self.0 = text::expect_str(payload)?;
        Ok(())
    }
}

/// Object identifier, kept in canonical dotted-decimal form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OidValue(String);

impl OidValue {
    pub fn new(dotted: &str) -> Result<Self, ChoiceError> {
        oid_canonical(dotted)
            .map(OidValue)
            .map_err(|msg| ChoiceError::InvalidSeed { type_tag: type_tags::OID, msg })
    }

    pub fn from_ber(ber: &[u8]) -> Result<Self, ChoiceError> {
        oid_from_ber(ber)
            .map(OidValue)
            .map_err(|msg| ChoiceError::InvalidSeed { type_tag: type_tags::OID, msg })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn factory(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        let oid = match seed {
            None => OidValue::default(),
            Some(Seed::Text(s)) => OidValue::new(&s)?,
            Some(Seed::Bytes(b)) => OidValue::from_ber(&b)?,
            Some(other) => {
                return Err(ChoiceError::UnexpectedSeed { type_tag: type_tags::OID, seed: other.kind() })
            }
        };
        Ok(Box::new(oid))
    }
}

impl fmt::Display for OidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TypeChoiceValue for OidValue {
    fn type_tag(&self) -> &str {
        type_tags::OID
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::empty("OID"));
        }
        oid_to_ber(&self.0).map(|_| ()).map_err(ValidationError::invalid)
    }

    fn to_cbor_payload(&self) -> Result<CborValue, EncodingError> {
        oid_to_ber(&self.0).map(CborValue::Bytes).map_err(EncodingError::Value)
    }

    fn set_cbor_payload(&mut self, payload: CborValue) -> Result<(), DecodeError> {
        let ber = binary::expect_bytes(payload)?;
        self.0 = oid_from_ber(&ber).map_err(DecodeError::InvalidValue)?;
        Ok(())
    }

    fn to_json_payload(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::String(self.0.clone()))
    }

    fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError> {
        let dotted = text::expect_str(payload)?;
        self.0 = oid_canonical(&dotted).map_err(DecodeError::InvalidValue)?;
        Ok(())
    }
}

/// RFC 4122 UUID. Binary payload is the 16 raw octets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UuidValue(pub Uuid);

impl UuidValue {
    pub fn parse(s: &str) -> Result<Self, ChoiceError> {
        Uuid::parse_str(s)
            .map(UuidValue)
            .map_err(|e| ChoiceError::InvalidSeed { type_tag: type_tags::UUID, msg: e.to_string() })
    }

    pub fn factory(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        let uuid = match seed {
            None => UuidValue::default(),
            Some(Seed::Text(s)) => UuidValue::parse(&s)?,
            Some(Seed::Bytes(b)) => Uuid::from_slice(&b).map(UuidValue).map_err(|e| {
                ChoiceError::InvalidSeed { type_tag: type_tags::UUID, msg: e.to_string() }
            })?,
            Some(other) => {
                return Err(ChoiceError::UnexpectedSeed { type_tag: type_tags::UUID, seed: other.kind() })
            }
        };
        Ok(Box::new(uuid))
    }
}

impl fmt::Display for UuidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl TypeChoiceValue for UuidValue {
    fn type_tag(&self) -> &str {
        type_tags::UUID
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_nil() {
            return Err(ValidationError::empty("UUID"));
        }
        Ok(())
    }

    fn to_cbor_payload(&self) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Bytes(self.0.as_bytes().to_vec()))
    }

    fn set_cbor_payload(&mut self, payload: CborValue) -> Result<(), DecodeError> {
        let raw = binary::expect_bytes(payload)?;
        self.0 = Uuid::from_slice(&raw).map_err(|e| DecodeError::InvalidValue(e.to_string()))?;
        Ok(())
    }

    fn to_json_payload(&self) -> Result<JsonValue, EncodingError> {
        Ok(JsonValue::String(self.to_string()))
    }

    fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError> {
        let s = text::expect_str(payload)?;
        self.0 = Uuid::parse_str(&s).map_err(|e| DecodeError::InvalidValue(e.to_string()))?;
        Ok(())
    }
}

/// Opaque byte string; base64 in the text form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BytesValue(pub Vec<u8>);

impl BytesValue {
    pub fn factory(seed: Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError> {
        let bytes = match seed {
            None => Vec::new(),
            Some(Seed::Bytes(b)) => b,
            Some(Seed::Text(s)) => hex::decode(&s).map_err(|e| ChoiceError::InvalidSeed {
                type_tag: type_tags::BYTES,
                msg: e.to_string(),
            })?,
            Some(other) => {
                return Err(ChoiceError::UnexpectedSeed { type_tag: type_tags::BYTES, seed: other.kind() })
            }
        };
        Ok(Box::new(BytesValue(bytes)))
    }
}

impl fmt::Display for BytesValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl TypeChoiceValue for BytesValue {
    fn type_tag(&self) -> &str {
        type_tags::BYTES
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::empty("bytes"));
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
        Ok(JsonValue::String(b64_encode(&self.0)))
    }

    fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError> {
        let s = text::expect_str(payload)?;
        self.0 = b64_decode(&s).map_err(DecodeError::InvalidValue)?;
        Ok(())
    }
}
