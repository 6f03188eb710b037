//! comid/triples.rs
//! Reference-value and endorsed-value triples.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record, WireValue};
use crate::comid::class::Environment;
use crate::comid::measurement::Measurement;
use crate::extensions::{bind_record, Extensible, ExtensionMap, ExtensionPoint, ExtensionSet};
use crate::validation::{validate_list, Validate, ValidationError};

pub const TRIPLES_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "reference-values"),
    FieldKey::new(1, "endorsed-values"),
];

/// An environment and what was measured in it. A two-element array in the
/// binary form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueTriple {
    pub environment: Environment,
    pub measurements: Vec<Measurement>,
}

impl ValueTriple {
    pub fn new(environment: Environment, measurements: Vec<Measurement>) -> Self {
        Self { environment, measurements }
    }
}

impl Validate for ValueTriple {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.measurements.is_empty() {
            return Err(ValidationError::missing("measurements"));
        }
        self.environment.validate().map_err(|e| e.at("environment"))?;
        validate_list("measurements", &self.measurements)
    }
}

impl WireValue for ValueTriple {
    fn to_cbor(&self, cx: &Codec<'_>) -> Result<CborValue, EncodingError> {
        Ok(CborValue::Array(vec![
            cx.record_to_cbor(&self.environment)?,
            binary::encode_list(&self.measurements, |m| cx.record_to_cbor(m))?,
        ]))
    }

    fn from_cbor(cx: &Codec<'_>, value: CborValue) -> Result<Self, DecodeError> {
        let mut items = binary::expect_array(value)?.into_iter();
        let (Some(env), Some(meas), None) = (items.next(), items.next(), items.next()) else {
            return Err(DecodeError::InvalidValue("value triple must be [environment, measurements]".into()));
        };
        Ok(Self {
            environment: cx.record_from_cbor(env).map_err(|e| e.in_field("environment"))?,
            measurements: binary::decode_list(meas, |m| cx.record_from_cbor(m))
                .map_err(|e| e.in_field("measurements"))?,
        })
    }

    fn to_json(&self, cx: &Codec<'_>) -> Result<JsonValue, EncodingError> {
        let mut out = JsonMap::new();
        out.insert("environment".into(), cx.record_to_json(&self.environment)?);
        out.insert(
            "measurements".into(),
            text::encode_list(&self.measurements, |m| cx.record_to_json(m))?,
        );
        Ok(JsonValue::Object(out))
    }

    fn from_json(cx: &Codec<'_>, value: JsonValue) -> Result<Self, DecodeError> {
        let mut obj = text::expect_object(value)?;
        let env = obj
            .remove("environment")
            .ok_or_else(|| DecodeError::InvalidValue("value triple without environment".into()))?;
        let meas = obj
            .remove("measurements")
            .ok_or_else(|| DecodeError::InvalidValue("value triple without measurements".into()))?;
        Ok(Self {
            environment: cx.record_from_json(env).map_err(|e| e.in_field("environment"))?,
            measurements: text::decode_list(meas, |m| cx.record_from_json(m))
                .map_err(|e| e.in_field("measurements"))?,
        })
    }
}

impl Extensible for ValueTriple {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        self.environment.bind_extensions(map);
        for m in &mut self.measurements {
            m.bind_extensions(map);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triples {
    pub reference_values: Vec<ValueTriple>,
    pub endorsed_values: Vec<ValueTriple>,
    pub extensions: ExtensionSet,
}

impl Triples {
    pub fn add_reference_value(&mut self, triple: ValueTriple) -> &mut Self {
        self.reference_values.push(triple);
        self
    }

    pub fn add_endorsed_value(&mut self, triple: ValueTriple) -> &mut Self {
        self.endorsed_values.push(triple);
        self
    }

    /// No triple of any kind and no extension.
    pub fn is_empty(&self) -> bool {
        self.reference_values.is_empty() && self.endorsed_values.is_empty() && self.extensions.is_empty()
    }
}

impl Validate for Triples {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::invalid("no triples"));
        }
        validate_list("reference-values", &self.reference_values)?;
        validate_list("endorsed-values", &self.endorsed_values)?;
        self.extensions.validate()
    }
}

impl Record for Triples {
    const NAME: &'static str = "triples";
    const FIELDS: &'static [FieldKey] = TRIPLES_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::TRIPLES);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if !self.reference_values.is_empty() {
            out.put(0, binary::encode_list(&self.reference_values, |t| t.to_cbor(cx))?);
        }
        if !self.endorsed_values.is_empty() {
            out.put(1, binary::encode_list(&self.endorsed_values, |t| t.to_cbor(cx))?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        let triples = binary::decode_list(value, |t| ValueTriple::from_cbor(cx, t))?;
        match key {
            0 => self.reference_values = triples,
            1 => self.endorsed_values = triples,
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if !self.reference_values.is_empty() {
            out.insert(
                "reference-values".into(),
                text::encode_list(&self.reference_values, |t| t.to_json(cx))?,
            );
        }
        if !self.endorsed_values.is_empty() {
            out.insert(
                "endorsed-values".into(),
                text::encode_list(&self.endorsed_values, |t| t.to_json(cx))?,
            );
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        let triples = text::decode_list(value, |t| ValueTriple::from_json(cx, t))?;
        match name {
            "reference-values" => self.reference_values = triples,
            "endorsed-values" => self.endorsed_values = triples,
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Triples {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
        for t in self.reference_values.iter_mut().chain(self.endorsed_values.iter_mut()) {
            t.bind_extensions(map);
        }
    }
}
