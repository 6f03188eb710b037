//! choice/types.rs
//! Core type-choice abstractions: families, discriminators, factories and the
//! capability contract every registered variant implements.

use std::any::Any;
use std::fmt;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::codec::{DecodeError, EncodingError};
use crate::extensions::ExtensionError;
use crate::validation::ValidationError;

/// A named, open set of interchangeable variants ("entity name",
/// "class identifier", ...). Type tags are unique within one family.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Family(&'static str);

impl Family {
    pub const ENTITY_NAME: Family = Family("entity-name");
    pub const CLASS_ID: Family = Family("class-id");
    pub const TAG_ID: Family = Family("tag-id");
    pub const CORIM_ID: Family = Family("corim-id");

    /// Families beyond the built-in ones are declared by profile authors.
    pub const fn new(name: &'static str) -> Self {
        Family(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a variant is recognized in the binary form.
///
/// `BareText` and `BareBytes` are structural shortcuts: an untagged CBOR text
/// or byte string selects the variant directly. `Tag` selects by CBOR tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Discriminator {
    BareText,
    BareBytes,
    Tag(u64),
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discriminator::BareText => write!(f, "bare text"),
            Discriminator::BareBytes => write!(f, "bare bytes"),
            Discriminator::Tag(t) => write!(f, "tag {}", t),
        }
    }
}

/// Input accepted by a variant factory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Seed {
    Text(String),
    Bytes(Vec<u8>),
    Uint(u64),
}

impl Seed {
    pub fn kind(&self) -> &'static str {
        match self {
            Seed::Text(_) => "text",
            Seed::Bytes(_) => "bytes",
            Seed::Uint(_) => "uint",
        }
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_string())
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Seed::Text(s)
    }
}

impl From<Vec<u8>> for Seed {
    fn from(b: Vec<u8>) -> Self {
        Seed::Bytes(b)
    }
}

impl From<u64> for Seed {
    fn from(n: u64) -> Self {
        Seed::Uint(n)
    }
}

/// Builds a variant from an optional seed. Called with `None` it must return
/// the variant's zero value; the registry relies on that to learn the type tag.
pub type ChoiceFactory = fn(Option<Seed>) -> Result<Box<dyn TypeChoiceValue>, ChoiceError>;

/// Object-safety helpers, blanket-implemented for every `Clone` variant.
pub trait ChoiceObject {
    fn clone_box(&self) -> Box<dyn TypeChoiceValue>;
    fn as_any(&self) -> &dyn Any;
}

impl<T> ChoiceObject for T
where
    T: TypeChoiceValue + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn TypeChoiceValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Capability contract of a registered variant.
///
/// `Display` is the canonical string form. Decoding writes into a zero value
/// obtained from the variant's factory.
pub trait TypeChoiceValue: ChoiceObject + fmt::Debug + fmt::Display + Send + Sync {
    fn type_tag(&self) -> &str;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Payload carried inside the binary envelope (or as the bare item).
    fn to_cbor_payload(&self) -> Result<CborValue, EncodingError>;
    fn set_cbor_payload(&mut self, payload: CborValue) -> Result<(), DecodeError>;

    /// Payload carried as the `value` member of the text envelope.
    fn to_json_payload(&self) -> Result<JsonValue, EncodingError>;
    fn set_json_payload(&mut self, payload: JsonValue) -> Result<(), DecodeError>;

    /// Data equality across trait objects.
    fn same_as(&self, other: &dyn TypeChoiceValue) -> bool {
        self.type_tag() == other.type_tag()
            && matches!(
                (self.to_cbor_payload(), other.to_cbor_payload()),
                (Ok(a), Ok(b)) if a == b
            )
    }
}

#[derive(Debug, Error)]
pub enum ChoiceError {
    #[error("unknown {family} variant: {key}")]
    UnknownVariant { family: Family, key: String },

    #[error("{type_tag} cannot be built from a {seed} seed")]
    UnexpectedSeed { type_tag: &'static str, seed: &'static str },

    #[error("invalid {type_tag} seed: {msg}")]
    InvalidSeed { type_tag: &'static str, msg: String },

    #[error("{family} has no bare-text variant")]
    NoPlainVariant { family: Family },
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("{family} variant with type tag {type_tag:?} already exists")]
    DuplicateTypeTag { family: Family, type_tag: String },

    #[error("{family} already has a variant selected by {discriminator}")]
    DuplicateDiscriminator { family: Family, discriminator: Discriminator },

    #[error("{family} factory failed its zero-value probe: {source}")]
    ProbeFailed { family: Family, source: ChoiceError },

    #[error("profile {id} already registered")]
    DuplicateProfile { id: String },

    #[error("registry sealed: cannot {action}")]
    Sealed { action: &'static str },

    #[error("profile {id} not registered")]
    UnknownProfile { id: String },

    #[error(transparent)]
    Extension(#[from] ExtensionError),
}
