//! corim/unsigned.rs
//! The unsigned CoRIM: an identified bundle of CoMID tags under one profile.

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::choice::CorimId;
use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap, TypeAndValue};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record, WireValue};
use crate::comid::{Comid, Entity};
use crate::constants::tags;
use crate::corim::meta::Validity;
use crate::extensions::{bind_record, Extensible, ExtensionMap, ExtensionPoint, ExtensionSet};
use crate::profile::ProfileId;
use crate::validation::{validate_list, validate_opt, Validate, ValidationError};

pub const UNSIGNED_CORIM_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "corim-id"),
    FieldKey::new(1, "tags"),
    FieldKey::new(3, "profile"),
    FieldKey::new(4, "rim-validity"),
    FieldKey::new(5, "entities"),
];

impl ExtensionPoint {
    pub const CORIM: ExtensionPoint = ExtensionPoint::new("corim", UNSIGNED_CORIM_FIELDS);
}

const PROFILE_KEY: i64 = 3;
const COMID_TAG_TYPE: &str = "comid";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnsignedCorim {
    pub id: Option<CorimId>,
    pub tags: Vec<Comid>,
    pub profile: Option<ProfileId>,
    pub rim_validity: Option<Validity>,
    pub entities: Vec<Entity>,
    pub extensions: ExtensionSet,
}

impl UnsignedCorim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-string CoRIM id.
    pub fn set_id(&mut self, id: &str) -> Result<&mut Self, ValidationError> {
        self.id = Some(CorimId::plain(id)?);
        Ok(self)
    }

    pub fn set_id_choice(&mut self, id: CorimId) -> &mut Self {
        self.id = Some(id);
        self
    }

    pub fn add_comid(&mut self, comid: Comid) -> &mut Self {
        self.tags.push(comid);
        self
    }

    pub fn set_profile(&mut self, profile: ProfileId) -> &mut Self {
        self.profile = Some(profile);
        self
    }

    pub fn set_rim_validity(&mut self, validity: Validity) -> &mut Self {
        self.rim_validity = Some(validity);
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.entities.push(entity);
        self
    }

    /// Binary form wrapped in the unsigned-CoRIM tag.
    pub fn to_tagged_cbor(&self, cx: &Codec<'_>) -> Result<Vec<u8>, EncodingError> {
        self.validate()
            .map_err(EncodingError::from)
            .and_then(|_| cx.record_to_cbor(self))
            .and_then(|v| binary::to_bytes(&binary::tagged(tags::UNSIGNED_CORIM, v)))
            .map_err(|e| e.in_record(Self::NAME))
    }

    pub fn from_tagged_cbor(cx: &Codec<'_>, data: &[u8]) -> Result<Self, DecodeError> {
        binary::from_bytes(data)
            .and_then(|v| binary::expect_tag(v, tags::UNSIGNED_CORIM))
            .and_then(|v| cx.record_from_cbor(v))
            .map_err(|e| e.in_record(Self::NAME))
    }
}

impl Validate for UnsignedCorim {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(id) = self.id.as_ref() else {
            return Err(ValidationError::missing("corim-id"));
        };
        if self.tags.is_empty() {
            return Err(ValidationError::missing("tags"));
        }
        id.validate().map_err(|e| e.at("corim-id"))?;
        validate_list("tags", &self.tags)?;
        validate_opt("rim-validity", self.rim_validity.as_ref())?;
        validate_list("entities", &self.entities)?;
        self.extensions.validate()
    }
}

fn comid_to_cbor(cx: &Codec<'_>, comid: &Comid) -> Result<CborValue, EncodingError> {
    let encoded = binary::to_bytes(&cx.record_to_cbor(comid)?)?;
    Ok(binary::tagged(tags::COMID, CborValue::Bytes(encoded)))
}

fn comid_from_cbor(cx: &Codec<'_>, value: CborValue) -> Result<Comid, DecodeError> {
    let encoded = binary::expect_bytes(binary::expect_tag(value, tags::COMID)?)?;
    cx.record_from_cbor(binary::from_bytes(&encoded)?)
}

fn comid_to_json(cx: &Codec<'_>, comid: &Comid) -> Result<JsonValue, EncodingError> {
    let value = cx.record_to_json(comid)?;
    Ok(TypeAndValue { type_tag: COMID_TAG_TYPE.to_string(), value }.into_json())
}

fn comid_from_json(cx: &Codec<'_>, value: JsonValue) -> Result<Comid, DecodeError> {
    let envelope = TypeAndValue::from_json(value)?;
    if envelope.type_tag != COMID_TAG_TYPE {
        return Err(DecodeError::InvalidValue(format!("unsupported tag type {:?}", envelope.type_tag)));
    }
    cx.record_from_json(envelope.value)
}

impl Record for UnsignedCorim {
    const NAME: &'static str = "unsigned corim";
    const FIELDS: &'static [FieldKey] = UNSIGNED_CORIM_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::CORIM);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.id {
            out.put(0, id.to_cbor(cx)?);
        }
        if !self.tags.is_empty() {
            out.put(1, binary::encode_list(&self.tags, |c| comid_to_cbor(cx, c))?);
        }
        if let Some(p) = &self.profile {
            out.put(PROFILE_KEY, p.to_cbor()?);
        }
        if let Some(v) = &self.rim_validity {
            out.put(4, cx.record_to_cbor(v)?);
        }
        if !self.entities.is_empty() {
            out.put(5, binary::encode_list(&self.entities, |e| cx.record_to_cbor(e))?);
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.id = Some(CorimId::from_cbor(cx, value)?),
            1 => self.tags = binary::decode_list(value, |c| comid_from_cbor(cx, c))?,
            PROFILE_KEY => self.profile = Some(ProfileId::from_cbor(value)?),
            4 => self.rim_validity = Some(cx.record_from_cbor(value)?),
            5 => self.entities = binary::decode_list(value, |e| cx.record_from_cbor(e))?,
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(id) = &self.id {
            out.insert("corim-id".into(), id.to_json(cx)?);
        }
        if !self.tags.is_empty() {
            out.insert("tags".into(), text::encode_list(&self.tags, |c| comid_to_json(cx, c))?);
        }
        if let Some(p) = &self.profile {
            out.insert("profile".into(), p.to_json());
        }
        if let Some(v) = &self.rim_validity {
            out.insert("rim-validity".into(), cx.record_to_json(v)?);
        }
        if !self.entities.is_empty() {
            out.insert("entities".into(), text::encode_list(&self.entities, |e| cx.record_to_json(e))?);
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "corim-id" => self.id = Some(CorimId::from_json(cx, value)?),
            "tags" => self.tags = text::decode_list(value, |c| comid_from_json(cx, c))?,
            "profile" => self.profile = Some(ProfileId::from_json(value)?),
            "rim-validity" => self.rim_validity = Some(cx.record_from_json(value)?),
            "entities" => self.entities = text::decode_list(value, |e| cx.record_from_json(e))?,
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }

    fn profile_hint_cbor(entries: &[(CborValue, CborValue)]) -> Option<ProfileId> {
        entries
            .iter()
            .find(|(k, _)| matches!(k, CborValue::Integer(i) if i64::try_from(*i).ok() == Some(PROFILE_KEY)))
            .and_then(|(_, v)| ProfileId::from_cbor(v.clone()).ok())
    }

    fn profile_hint_json(members: &JsonMap) -> Option<ProfileId> {
        members.get("profile").cloned().and_then(|v| ProfileId::from_json(v).ok())
    }
}

impl Extensible for UnsignedCorim {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
        for c in &mut self.tags {
            c.bind_extensions(map);
        }
        for e in &mut self.entities {
            e.bind_extensions(map);
        }
    }
}
