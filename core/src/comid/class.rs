//! comid/class.rs
//! Environment classes and the environment that names them.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::choice::{BytesValue, ChoiceError, ClassId, OidValue, UuidValue};
use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record, WireValue};
use crate::extensions::{bind_record, Extensible, ExtensionMap, ExtensionPoint, ExtensionSet};
use crate::validation::{non_empty_opt, Validate, ValidationError};

pub const CLASS_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "id"),
    FieldKey::new(1, "vendor"),
    FieldKey::new(2, "model"),
    FieldKey::new(3, "layer"),
    FieldKey::new(4, "index"),
];

pub const ENVIRONMENT_FIELDS: &[FieldKey] = &[FieldKey::new(0, "class")];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Class {
    pub class_id: Option<ClassId>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub layer: Option<u64>,
    pub index: Option<u64>,
    pub extensions: ExtensionSet,
}

impl Class {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_class_id(&mut self, id: ClassId) -> &mut Self {
        self.class_id = Some(id);
        self
    }

    pub fn set_oid(&mut self, dotted: &str) -> Result<&mut Self, ChoiceError> {
        self.class_id = Some(ClassId::from_value(OidValue::new(dotted)?));
        Ok(self)
    }

    pub fn set_uuid(&mut self, uuid: Uuid) -> &mut Self {
        self.class_id = Some(ClassId::from_value(UuidValue(uuid)));
        self
    }

    pub fn set_bytes(&mut self, bytes: Vec<u8>) -> &mut Self {
        self.class_id = Some(ClassId::from_value(BytesValue(bytes)));
        self
    }

    pub fn set_vendor(&mut self, vendor: &str) -> &mut Self {
        self.vendor = Some(vendor.to_string());
        self
    }

    pub fn set_model(&mut self, model: &str) -> &mut Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn set_layer(&mut self, layer: u64) -> &mut Self {
        self.layer = Some(layer);
        self
    }

    pub fn set_index(&mut self, index: u64) -> &mut Self {
        self.index = Some(index);
        self
    }
}

impl Validate for Class {
    fn validate(&self) -> Result<(), ValidationError> {
        let any_set = self.class_id.is_some()
            || self.vendor.is_some()
            || self.model.is_some()
            || self.layer.is_some()
            || self.index.is_some();
        if !any_set && self.extensions.is_empty() {
            return Err(ValidationError::invalid("class must not be empty"));
        }
        if let Some(id) = &self.class_id {
            id.validate().map_err(|e| e.at("id"))?;
        }
        non_empty_opt("vendor", self.vendor.as_deref())?;
        non_empty_opt("model", self.model.as_deref())?;
        self.extensions.validate()
    }
}

impl Record for Class {
    const NAME: &'static str = "class";
    const FIELDS: &'static [FieldKey] = CLASS_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::CLASS);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.class_id {
            out.put(0, id.to_cbor(cx)?);
        }
        out.put_opt(1, self.vendor.as_deref().map(binary::text));
        out.put_opt(2, self.model.as_deref().map(binary::text));
        out.put_opt(3, self.layer.map(binary::uint));
        out.put_opt(4, self.index.map(binary::uint));
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.class_id = Some(ClassId::from_cbor(cx, value)?),
            1 => self.vendor = Some(binary::expect_text(value)?),
            2 => self.model = Some(binary::expect_text(value)?),
            3 => self.layer = Some(binary::expect_uint(value)?),
            4 => self.index = Some(binary::expect_uint(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.class_id {
            out.insert("id".into(), id.to_json(cx)?);
        }
        if let Some(v) = &self.vendor {
            out.insert("vendor".into(), JsonValue::String(v.clone()));
        }
        if let Some(m) = &self.model {
            out.insert("model".into(), JsonValue::String(m.clone()));
        }
        if let Some(l) = self.layer {
            out.insert("layer".into(), JsonValue::from(l));
        }
        if let Some(i) = self.index {
            out.insert("index".into(), JsonValue::from(i));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "id" => self.class_id = Some(ClassId::from_json(cx, value)?),
            "vendor" => self.vendor = Some(text::expect_str(value)?),
            "model" => self.model = Some(text::expect_str(value)?),
            "layer" => self.layer = Some(text::expect_u64(value)?),
            "index" => self.index = Some(text::expect_u64(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Class {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    pub class: Option<Class>,
}

impl Environment {
    pub fn new(class: Class) -> Self {
        Self { class: Some(class) }
    }
}

impl Validate for Environment {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(class) = self.class.as_ref() else {
            return Err(ValidationError::missing("class"));
        };
        class.validate().map_err(|e| e.at("class"))
    }
}

impl Record for Environment {
    const NAME: &'static str = "environment";
    const FIELDS: &'static [FieldKey] = ENVIRONMENT_FIELDS;

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(c) = &self.class {
            out.put(0, cx.record_to_cbor(c)?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.class = Some(cx.record_from_cbor(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(c) = &self.class {
            out.insert("class".into(), cx.record_to_json(c)?);
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "class" => self.class = Some(cx.record_from_json(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Environment {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        if let Some(c) = self.class.as_mut() {
            c.bind_extensions(map);
        }
    }
}
