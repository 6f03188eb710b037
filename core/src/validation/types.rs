//! validation/types.rs
//! Validation error chain and the `Validate` contract.

use std::fmt;

/// One hop in the path from a validated record down to the failing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Fixed field of a record, by its text wire name.
    Field(&'static str),
    /// Element of a collection-valued field.
    Index { list: &'static str, index: usize },
    /// Entry of a record's extension set.
    Extension(String),
    /// Payload of a type-choice variant, by type tag.
    Variant(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, "{}", name),
            PathSegment::Index { list, index } => write!(f, "index {} of {}", index, list),
            PathSegment::Extension(key) => write!(f, "extension {}", key),
            PathSegment::Variant(tag) => write!(f, "{} value", tag),
        }
    }
}

/// Root cause of a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    /// A mandatory field is absent.
    MissingField(&'static str),
    /// A field is present but empty where a non-empty value is required.
    Empty(&'static str),
    /// Any other structural violation.
    Invalid(String),
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::MissingField(name) => write!(f, "missing mandatory field {}", name),
            Cause::Empty(name) => write!(f, "empty {}", name),
            Cause::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

/// Validation failure with positional context.
///
/// The path is stored innermost-first while the error bubbles up; `path()`
/// returns it outermost-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    cause: Cause,
    rev_path: Vec<PathSegment>,
}

impl ValidationError {
    pub fn new(cause: Cause) -> Self {
        Self { cause, rev_path: Vec::new() }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(Cause::MissingField(field))
    }

    pub fn empty(what: &'static str) -> Self {
        Self::new(Cause::Empty(what))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(Cause::Invalid(msg.into()))
    }

    /// Wrap with the name of the field that held the failing value.
    pub fn at(mut self, field: &'static str) -> Self {
        self.rev_path.push(PathSegment::Field(field));
        self
    }

    /// Wrap with the position inside a collection-valued field.
    pub fn at_index(mut self, list: &'static str, index: usize) -> Self {
        self.rev_path.push(PathSegment::Index { list, index });
        self
    }

    pub fn at_extension(mut self, key: impl Into<String>) -> Self {
        self.rev_path.push(PathSegment::Extension(key.into()));
        self
    }

    pub fn at_variant(mut self, type_tag: impl Into<String>) -> Self {
        self.rev_path.push(PathSegment::Variant(type_tag.into()));
        self
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn path(&self) -> Vec<&PathSegment> {
        self.rev_path.iter().rev().collect()
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self.cause, Cause::MissingField(_))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in self.rev_path.iter().rev() {
            write!(f, "{}: ", seg)?;
        }
        write!(f, "{}", self.cause)
    }
}

impl std::error::Error for ValidationError {}

/// Self-validation contract implemented by every record and value type.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validate each element of a list, wrapping failures with the index.
pub fn validate_list<T: Validate>(list: &'static str, items: &[T]) -> Result<(), ValidationError> {
    for (i, item) in items.iter().enumerate() {
        item.validate().map_err(|e| e.at_index(list, i))?;
    }
    Ok(())
}

/// Validate an optional child, wrapping failures with the field name.
pub fn validate_opt<T: Validate>(field: &'static str, value: Option<&T>) -> Result<(), ValidationError> {
    match value {
        Some(v) => v.validate().map_err(|e| e.at(field)),
        None => Ok(()),
    }
}

/// Present-but-empty strings are rejected; absent ones pass.
pub fn non_empty_opt(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some("") => Err(ValidationError::empty(field)),
        _ => Ok(()),
    }
}
