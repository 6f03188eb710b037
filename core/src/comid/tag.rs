//! comid/tag.rs
//! The CoMID tag and its identity.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::choice::TagId;
use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record, WireValue};
use crate::comid::entity::Entity;
use crate::comid::triples::{Triples, ValueTriple};
use crate::extensions::{bind_record, Extensible, ExtensionMap, ExtensionPoint, ExtensionSet};
use crate::validation::{non_empty_opt, validate_list, Validate, ValidationError};

pub const COMID_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "lang"),
    FieldKey::new(1, "tag-identity"),
    FieldKey::new(2, "entities"),
    FieldKey::new(4, "triples"),
];

pub const TAG_IDENTITY_FIELDS: &[FieldKey] = &[FieldKey::new(0, "id"), FieldKey::new(1, "version")];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TagIdentity {
    pub tag_id: Option<TagId>,
    pub tag_version: Option<u64>,
}

impl TagIdentity {
    pub fn new(tag_id: TagId) -> Self {
        Self { tag_id: Some(tag_id), tag_version: None }
    }
}

impl Validate for TagIdentity {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(id) = self.tag_id.as_ref() else {
            return Err(ValidationError::missing("id"));
        };
        id.validate().map_err(|e| e.at("id"))
    }
}

impl Record for TagIdentity {
    const NAME: &'static str = "tag identity";
    const FIELDS: &'static [FieldKey] = TAG_IDENTITY_FIELDS;

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.tag_id {
            out.put(0, id.to_cbor(cx)?);
        }
        out.put_opt(1, self.tag_version.map(binary::uint));
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.tag_id = Some(TagId::from_cbor(cx, value)?),
            1 => self.tag_version = Some(binary::expect_uint(value)?),
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.tag_id {
            out.insert("id".into(), id.to_json(cx)?);
        }
        if let Some(v) = self.tag_version {
            out.insert("version".into(), JsonValue::from(v));
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "id" => self.tag_id = Some(TagId::from_json(cx, value)?),
            "version" => self.tag_version = Some(text::expect_u64(value)?),
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

/// Concise Module Identifier tag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comid {
    pub language: Option<String>,
    pub tag_identity: Option<TagIdentity>,
    pub entities: Vec<Entity>,
    pub triples: Triples,
    pub extensions: ExtensionSet,
}

impl Comid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_language(&mut self, language: &str) -> &mut Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn set_tag_identity(&mut self, tag_id: TagId, version: Option<u64>) -> &mut Self {
        self.tag_identity = Some(TagIdentity { tag_id: Some(tag_id), tag_version: version });
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    pub fn add_reference_value(&mut self, triple: ValueTriple) -> &mut Self {
        self.triples.add_reference_value(triple);
        self
    }

    pub fn add_endorsed_value(&mut self, triple: ValueTriple) -> &mut Self {
        self.triples.add_endorsed_value(triple);
        self
    }
}

impl Validate for Comid {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(identity) = self.tag_identity.as_ref() else {
            return Err(ValidationError::missing("tag-identity"));
        };
        if self.triples.is_empty() {
            return Err(ValidationError::missing("triples"));
        }
        non_empty_opt("lang", self.language.as_deref())?;
        identity.validate().map_err(|e| e.at("tag-identity"))?;
        validate_list("entities", &self.entities)?;
        self.triples.validate().map_err(|e| e.at("triples"))?;
        self.extensions.validate()
    }
}

impl Record for Comid {
    const NAME: &'static str = "comid";
    const FIELDS: &'static [FieldKey] = COMID_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::COMID);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        out.put_opt(0, self.language.as_deref().map(binary::text));
        if let Some(identity) = &self.tag_identity {
            out.put(1, cx.record_to_cbor(identity)?);
        }
        if !self.entities.is_empty() {
            out.put(2, binary::encode_list(&self.entities, |e| cx.record_to_cbor(e))?);
        }
        if !self.triples.is_empty() {
            out.put(4, cx.record_to_cbor(&self.triples)?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.language = Some(binary::expect_text(value)?),
            1 => self.tag_identity = Some(cx.record_from_cbor(value)?),
            2 => self.entities = binary::decode_list(value, |e| cx.record_from_cbor(e))?,
            4 => self.triples = cx.record_from_cbor(value)?,
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(lang) = &self.language {
            out.insert("lang".into(), JsonValue::String(lang.clone()));
        }
        if let Some(identity) = &self.tag_identity {
            out.insert("tag-identity".into(), cx.record_to_json(identity)?);
        }
        if !self.entities.is_empty() {
            out.insert("entities".into(), text::encode_list(&self.entities, |e| cx.record_to_json(e))?);
        }
        if !self.triples.is_empty() {
            out.insert("triples".into(), cx.record_to_json(&self.triples)?);
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "lang" => self.language = Some(text::expect_str(value)?),
            "tag-identity" => self.tag_identity = Some(cx.record_from_json(value)?),
            "entities" => self.entities = text::decode_list(value, |e| cx.record_from_json(e))?,
            "triples" => self.triples = cx.record_from_json(value)?,
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Comid {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
        for e in &mut self.entities {
            e.bind_extensions(map);
        }
        self.triples.bind_extensions(map);
    }
}
