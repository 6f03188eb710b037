//! extensions/types.rs
//! Extension value capability set, extension points and errors.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::codec::{DecodeError, EncodingError, FieldKey};
use crate::extensions::shape::ExtensionMap;
use crate::validation::ValidationError;

/// Object-safety helpers, blanket-implemented for every `Clone` value.
pub trait ExtensionObject {
    fn clone_box(&self) -> Box<dyn ExtensionValue>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> ExtensionObject for T
where
    T: ExtensionValue + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn ExtensionValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Capability set of a pluggable extension value: binary-encodable,
/// text-encodable, self-validating.
pub trait ExtensionValue: ExtensionObject + fmt::Debug + Send + Sync {
    fn to_cbor(&self) -> Result<CborValue, EncodingError>;

    fn to_json(&self) -> Result<JsonValue, EncodingError>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn same_as(&self, other: &dyn ExtensionValue) -> bool {
        self.as_any().type_id() == other.as_any().type_id()
            && matches!((self.to_cbor(), other.to_cbor()), (Ok(a), Ok(b)) if a == b)
    }
}

/// Decoding half, kept out of `ExtensionValue` so the latter stays
/// object-safe. A shape stores monomorphized decoders for each field.
pub trait ExtensionDecode: ExtensionValue + Sized + 'static {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError>;
    fn from_json(value: JsonValue) -> Result<Self, DecodeError>;
}

/// Extensible record kind to which a profile may bind a shape.
///
/// A point carries the fixed-field table of its record, so shapes can be
/// checked against it. The concrete points are declared next to their
/// records (`comid`, `corim`).
#[derive(Clone, Copy, Debug)]
pub struct ExtensionPoint {
    name: &'static str,
    fixed: &'static [FieldKey],
    alias_of: Option<&'static ExtensionPoint>,
}

impl ExtensionPoint {
    pub const fn new(name: &'static str, fixed: &'static [FieldKey]) -> Self {
        Self { name, fixed, alias_of: None }
    }

    pub const fn alias(name: &'static str, target: &'static ExtensionPoint) -> Self {
        Self { name, fixed: target.fixed, alias_of: Some(target) }
    }

    /// The point a shape is actually bound to.
    pub fn canonical(self) -> ExtensionPoint {
        match self.alias_of {
            Some(target) => target.canonical(),
            None => self,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fixed_fields(&self) -> &'static [FieldKey] {
        self.fixed
    }
}

impl PartialEq for ExtensionPoint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ExtensionPoint {}

impl Hash for ExtensionPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for ExtensionPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExtensionPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name)
    }
}

impl fmt::Display for ExtensionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Record graphs that can receive extension shapes from a map. Implementors
/// bind their own set and recurse into their children.
pub trait Extensible {
    fn bind_extensions(&mut self, map: &ExtensionMap);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("extension {key} not set")]
    NotFound { key: String },

    #[error("no extension shape bound; cannot set {key}")]
    NoShape { key: String },

    #[error("extension {key} is not declared by the bound shape")]
    UnknownKey { key: String },

    #[error("extension {key} holds {expected}, not {found}")]
    TypeMismatch { key: String, expected: &'static str, found: &'static str },

    #[error("duplicate extension key {key}")]
    DuplicateKey { key: String },

    #[error("duplicate extension wire slot {slot}")]
    DuplicateSlot { slot: i64 },

    #[error("duplicate extension text name {name}")]
    DuplicateName { name: String },

    #[error("extension {key} collides with a fixed field of {point}")]
    FixedFieldCollision { point: &'static str, key: String },

    #[error("extension point {point} bound twice")]
    DuplicatePoint { point: &'static str },
}
