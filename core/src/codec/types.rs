//! codec/types.rs
//! Codec configuration and the decode/encode error taxonomy.

use std::fmt;
use thiserror::Error;

use crate::choice::{ChoiceError, Family};
use crate::validation::ValidationError;

/// The two interchangeable wire encodings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WireFormat {
    Binary,
    Text,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Binary => write!(f, "CBOR"),
            WireFormat::Text => write!(f, "JSON"),
        }
    }
}

/// Decode-time behavior switches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecConfig {
    /// Report wire keys that match neither a fixed field nor a bound extension
    /// as `DecodeError::UnknownField` instead of skipping them.
    pub strict: bool,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed {format} input: {msg}")]
    Malformed { format: WireFormat, msg: String },

    #[error("{count} trailing bytes after {format} item")]
    TrailingData { format: WireFormat, count: usize },

    #[error("expected {expected}, found {found}")]
    UnexpectedType { expected: &'static str, found: String },

    #[error("unknown {family} variant: {discriminator}")]
    UnknownVariant { family: Family, discriminator: String },

    #[error("unknown field {key} in {record}")]
    UnknownField { record: &'static str, key: String },

    #[error("duplicate field {key} in {record}")]
    DuplicateField { record: &'static str, key: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid {type_tag}: {source}")]
    InvalidVariant { type_tag: String, source: ValidationError },

    #[error("{family} {type_tag}: {source}")]
    Variant { family: Family, type_tag: String, source: Box<DecodeError> },

    #[error("{field}: {source}")]
    Field { field: &'static str, source: Box<DecodeError> },

    #[error("index {index}: {source}")]
    Index { index: usize, source: Box<DecodeError> },

    #[error("extension {key}: {source}")]
    Extension { key: String, source: Box<DecodeError> },

    #[error("{record}: {source}")]
    Record { record: &'static str, source: Box<DecodeError> },

    #[error(transparent)]
    Choice(#[from] ChoiceError),
}

impl DecodeError {
    pub fn unexpected(expected: &'static str, found: impl fmt::Debug) -> Self {
        let found: String = format!("{:?}", found).chars().take(64).collect();
        DecodeError::UnexpectedType { expected, found }
    }

    pub fn in_field(self, field: &'static str) -> Self {
        DecodeError::Field { field, source: Box::new(self) }
    }

    pub fn at_index(self, index: usize) -> Self {
        DecodeError::Index { index, source: Box::new(self) }
    }

    pub fn in_record(self, record: &'static str) -> Self {
        DecodeError::Record { record, source: Box::new(self) }
    }

    /// Innermost error, skipping every context wrapper.
    pub fn root(&self) -> &DecodeError {
        match self {
            DecodeError::Variant { source, .. }
            | DecodeError::Field { source, .. }
            | DecodeError::Index { source, .. }
            | DecodeError::Extension { source, .. }
            | DecodeError::Record { source, .. } => source.root(),
            other => other,
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("refusing to encode invalid value: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{record}: {source}")]
    Record { record: &'static str, source: Box<EncodingError> },

    #[error("{family} {type_tag}: no variant registered under this type tag")]
    UnregisteredVariant { family: Family, type_tag: String },

    #[error("extension {key}: {msg}")]
    Extension { key: String, msg: String },

    #[error("{format} serialization failed: {msg}")]
    Serialize { format: WireFormat, msg: String },

    #[error("unencodable value: {0}")]
    Value(String),
}

impl EncodingError {
    pub fn in_record(self, record: &'static str) -> Self {
        EncodingError::Record { record, source: Box::new(self) }
    }

    pub fn root(&self) -> &EncodingError {
        match self {
            EncodingError::Record { source, .. } => source.root(),
            other => other,
        }
    }
}
