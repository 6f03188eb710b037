//! comid/entity.rs
//! Entities: who created or maintains a tag, and in which roles.

use ciborium::value::Value as CborValue;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_json::Value as JsonValue;

use crate::choice::EntityName;
use crate::codec::binary::{self, CborMap};
use crate::codec::text::{self, JsonMap};
use crate::codec::{not_a_field, Codec, DecodeError, EncodingError, FieldKey, Record, WireValue};
use crate::constants::tags;
use crate::extensions::{bind_record, Extensible, ExtensionMap, ExtensionPoint, ExtensionSet};
use crate::utils::is_absolute_uri;
use crate::validation::{Validate, ValidationError};

pub const ENTITY_FIELDS: &[FieldKey] = &[
    FieldKey::new(0, "name"),
    FieldKey::new(1, "regid"),
    FieldKey::new(2, "roles"),
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum Role {
    TagCreator = 0,
    Creator = 1,
    Maintainer = 2,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::TagCreator => "tagCreator",
            Role::Creator => "creator",
            Role::Maintainer => "maintainer",
        }
    }

    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "tagCreator" => Some(Role::TagCreator),
            "creator" => Some(Role::Creator),
            "maintainer" => Some(Role::Maintainer),
            _ => None,
        }
    }
}

/// Roles in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roles(Vec<Role>);

impl Roles {
    pub fn add(&mut self, role: Role) -> &mut Self {
        self.0.push(role);
        self
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_cbor(&self) -> CborValue {
        CborValue::Array(self.0.iter().map(|r| binary::uint(u64::from(*r))).collect())
    }

    pub fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::decode_list(value, |item| {
            let n = binary::expect_uint(item)?;
            Role::try_from(n).map_err(|_| DecodeError::InvalidValue(format!("unknown role {}", n)))
        })
        .map(Roles)
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.0.iter().map(|r| JsonValue::String(r.name().into())).collect())
    }

    pub fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        text::decode_list(value, |item| {
            let name = text::expect_str(item)?;
            Role::from_name(&name).ok_or_else(|| DecodeError::InvalidValue(format!("unknown role {:?}", name)))
        })
        .map(Roles)
    }
}

impl Validate for Roles {
    fn validate(&self) -> Result<(), ValidationError> {
        for (i, role) in self.0.iter().enumerate() {
            if self.0[..i].contains(role) {
                return Err(ValidationError::invalid(format!("duplicate role {}", role.name())).at_index("roles", i));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub name: Option<EntityName>,
    pub reg_id: Option<String>,
    pub roles: Roles,
    pub extensions: ExtensionSet,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain-string entity name.
    pub fn set_name(&mut self, name: &str) -> Result<&mut Self, ValidationError> {
        self.name = Some(EntityName::plain(name)?);
        Ok(self)
    }

    pub fn set_name_choice(&mut self, name: EntityName) -> &mut Self {
        self.name = Some(name);
        self
    }

    pub fn set_reg_id(&mut self, uri: &str) -> Result<&mut Self, ValidationError> {
        if !is_absolute_uri(uri) {
            return Err(ValidationError::invalid(format!("{:?} is not an absolute URI", uri)).at("regid"));
        }
        self.reg_id = Some(uri.to_string());
        Ok(self)
    }

    pub fn add_role(&mut self, role: Role) -> &mut Self {
        self.roles.add(role);
        self
    }
}

impl Validate for Entity {
    fn validate(&self) -> Result<(), ValidationError> {
        let Some(name) = self.name.as_ref() else {
            return Err(ValidationError::missing("name"));
        };
        if self.roles.is_empty() {
            return Err(ValidationError::missing("roles"));
        }
        name.validate().map_err(|e| e.at("name"))?;
        match self.reg_id.as_deref() {
            Some("") => return Err(ValidationError::empty("regid")),
            Some(uri) if !is_absolute_uri(uri) => {
                return Err(ValidationError::invalid(format!("{:?} is not an absolute URI", uri)).at("regid"))
            }
            _ => {}
        }
        self.roles.validate()?;
        self.extensions.validate()
    }
}

impl Record for Entity {
    const NAME: &'static str = "entity";
    const FIELDS: &'static [FieldKey] = ENTITY_FIELDS;
    const EXTENSION_POINT: Option<ExtensionPoint> = Some(ExtensionPoint::ENTITY);

    fn extensions(&self) -> Option<&ExtensionSet> {
        Some(&self.extensions)
    }

    fn extensions_mut(&mut self) -> Option<&mut ExtensionSet> {
        Some(&mut self.extensions)
    }

    fn encode_fields_cbor(&self, cx: &Codec<'_>, out: &mut CborMap) -> Result<(), EncodingError> {
        if let Some(name) = &self.name {
            out.put(0, name.to_cbor(cx)?);
        }
        if let Some(uri) = &self.reg_id {
            out.put(1, binary::tagged(tags::URI, binary::text(uri)));
        }
        if !self.roles.is_empty() {
            out.put(2, self.roles.to_cbor());
        }
        Ok(())
    }

    fn decode_field_cbor(&mut self, cx: &Codec<'_>, key: i64, value: CborValue) -> Result<(), DecodeError> {
        match key {
            0 => self.name = Some(EntityName::from_cbor(cx, value)?),
            1 => self.reg_id = Some(binary::expect_text(binary::expect_tag(value, tags::URI)?)?),
            2 => self.roles = Roles::from_cbor(value)?,
            _ => return Err(not_a_field(Self::NAME, key)),
        }
        Ok(())
    }

    fn encode_fields_json(&self, cx: &Codec<'_>, out: &mut JsonMap) -> Result<(), EncodingError> {
        if let Some(name) = &self.name {
            out.insert("name".into(), name.to_json(cx)?);
        }
        if let Some(uri) = &self.reg_id {
            out.insert("regid".into(), JsonValue::String(uri.clone()));
        }
        if !self.roles.is_empty() {
            out.insert("roles".into(), self.roles.to_json());
        }
        Ok(())
    }

    fn decode_field_json(&mut self, cx: &Codec<'_>, name: &str, value: JsonValue) -> Result<(), DecodeError> {
        match name {
            "name" => self.name = Some(EntityName::from_json(cx, value)?),
            "regid" => self.reg_id = Some(text::expect_str(value)?),
            "roles" => self.roles = Roles::from_json(value)?,
            _ => return Err(not_a_field(Self::NAME, name)),
        }
        Ok(())
    }
}

impl Extensible for Entity {
    fn bind_extensions(&mut self, map: &ExtensionMap) {
        bind_record(self, map);
    }
}
