//! profile/types.rs
//! Profile identifiers and profiles.

use std::fmt;
use std::sync::Arc;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::codec::{binary, text, DecodeError, EncodingError, Record};
use crate::comid::Comid;
use crate::constants::tags;
use crate::corim::UnsignedCorim;
use crate::extensions::{Extensible, ExtensionMap};
use crate::utils::{is_absolute_uri, oid_canonical, oid_from_ber, oid_to_ber};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("invalid profile id {id:?}: {msg}")]
    InvalidId { id: String, msg: String },
}

/// Globally unique profile token: an absolute URI or an OID.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProfileId {
    Uri(String),
    Oid(String),
}

impl ProfileId {
    /// Dotted-decimal input is an OID; anything else must be an absolute URI.
    pub fn parse(s: &str) -> Result<Self, ProfileError> {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return oid_canonical(s)
                .map(ProfileId::Oid)
                .map_err(|msg| ProfileError::InvalidId { id: s.to_string(), msg });
        }
        if is_absolute_uri(s) {
            return Ok(ProfileId::Uri(s.to_string()));
        }
        Err(ProfileError::InvalidId { id: s.to_string(), msg: "neither an OID nor an absolute URI".into() })
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProfileId::Uri(s) | ProfileId::Oid(s) => s,
        }
    }

    pub fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        match self {
            ProfileId::Uri(uri) => Ok(binary::tagged(tags::URI, binary::text(uri))),
            ProfileId::Oid(oid) => oid_to_ber(oid)
                .map(|ber| binary::tagged(tags::OID, CborValue::Bytes(ber)))
                .map_err(EncodingError::Value),
        }
    }

    pub fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        match value {
            CborValue::Tag(tags::URI, inner) => {
                let uri = binary::expect_text(*inner)?;
                if !is_absolute_uri(&uri) {
                    return Err(DecodeError::InvalidValue(format!("{:?} is not an absolute URI", uri)));
                }
                Ok(ProfileId::Uri(uri))
            }
            CborValue::Tag(tags::OID, inner) => {
                let ber = binary::expect_bytes(*inner)?;
                oid_from_ber(&ber).map(ProfileId::Oid).map_err(DecodeError::InvalidValue)
            }
            other => Err(DecodeError::unexpected("URI or OID profile", other)),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::String(self.as_str().to_string())
    }

    pub fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        let s = text::expect_str(value)?;
        ProfileId::parse(&s).map_err(|e| DecodeError::InvalidValue(e.to_string()))
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProfileId {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileId::parse(s)
    }
}

/// A registered profile: its shapes and an optional CoMID template.
#[derive(Debug, Clone)]
pub struct Profile {
    id: ProfileId,
    extensions: Arc<ExtensionMap>,
    template: Option<Comid>,
}

impl Profile {
    pub fn new(id: ProfileId, extensions: ExtensionMap) -> Self {
        Self { id, extensions: Arc::new(extensions), template: None }
    }

    pub fn with_template(mut self, template: Comid) -> Self {
        self.template = Some(template);
        self
    }

    pub fn id(&self) -> &ProfileId {
        &self.id
    }

    pub fn extensions(&self) -> Arc<ExtensionMap> {
        Arc::clone(&self.extensions)
    }

    /// Fresh CoMID with this profile's shapes bound throughout.
    pub fn get_template(&self) -> Comid {
        let mut comid = self.template.clone().unwrap_or_default();
        comid.bind_extensions(&self.extensions);
        comid
    }

    /// Fresh unsigned CoRIM declaring this profile.
    pub fn get_unsigned_corim(&self) -> UnsignedCorim {
        let mut corim = UnsignedCorim::default();
        corim.set_profile(self.id.clone());
        corim.bind_extensions(&self.extensions);
        corim
    }

    /// Empty record of kind `R` with this profile's shapes bound.
    pub fn new_record<R: Record + Extensible>(&self) -> R {
        let mut record = R::default();
        record.bind_extensions(&self.extensions);
        record
    }

    pub fn bind<T: Extensible>(&self, target: &mut T) {
        target.bind_extensions(&self.extensions);
    }
}
