//! choice/value.rs
//! `TypeChoice<F>`: an owned variant of family `F` and its wire algorithms.
//!
//! Design notes:
//! - Binary decode dispatches on the item's structure: a bare text string or
//!   byte string selects the `BareText`/`BareBytes` variant, a tagged item
//!   selects by tag.
//! - Text decode tries the bare string first, then the `{"type","value"}`
//!   envelope; enveloped payloads are validated on the spot.
//! - Encode validates first and emits nothing for an invalid value.

use std::fmt;
use std::marker::PhantomData;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::choice::builtins::PlainText;
use crate::choice::registry::TypeChoiceRegistry;
use crate::choice::types::{ChoiceError, Discriminator, Family, Seed, TypeChoiceValue};
use crate::codec::text::TypeAndValue;
use crate::codec::{binary, Codec, DecodeError, EncodingError, WireValue};
use crate::validation::{Validate, ValidationError};

/// Compile-time handle on a family.
pub trait ChoiceFamily: 'static + Send + Sync {
    const FAMILY: Family;
}

/// Families whose bare-text variant is `PlainText`.
pub trait PlainTextFamily: ChoiceFamily {}

pub struct TypeChoice<F: ChoiceFamily> {
    value: Box<dyn TypeChoiceValue>,
    _family: PhantomData<F>,
}

impl<F: ChoiceFamily> TypeChoice<F> {
    pub fn from_value(value: impl TypeChoiceValue + 'static) -> Self {
        Self::from_boxed(Box::new(value))
    }

    pub fn from_boxed(value: Box<dyn TypeChoiceValue>) -> Self {
        Self { value, _family: PhantomData }
    }

    /// Build the variant registered under `type_tag` from `seed`.
    pub fn new_in(
        registry: &TypeChoiceRegistry,
        type_tag: &str,
        seed: Option<Seed>,
    ) -> Result<Self, ChoiceError> {
        let resolved = registry.resolve_by_type_tag(F::FAMILY, type_tag)?;
        (resolved.factory)(seed).map(Self::from_boxed)
    }

    /// Assert wrapper over `new_in` for statically known-valid literals.
    /// Panics on failure; never use on external input.
    pub fn new_asserted(registry: &TypeChoiceRegistry, type_tag: &str, seed: Option<Seed>) -> Self {
        match Self::new_in(registry, type_tag, seed) {
            Ok(v) => v,
            Err(e) => panic!("{} {}: {}", F::FAMILY, type_tag, e),
        }
    }

    pub fn family() -> Family {
        F::FAMILY
    }

    pub fn type_tag(&self) -> &str {
        self.value.type_tag()
    }

    pub fn value(&self) -> &dyn TypeChoiceValue {
        self.value.as_ref()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.as_any().downcast_ref::<T>()
    }

    fn encode_cbor(&self, types: &TypeChoiceRegistry) -> Result<CborValue, EncodingError> {
        self.value.validate()?;
        let resolved = types
            .resolve_by_type_tag(F::FAMILY, self.type_tag())
            .map_err(|_| EncodingError::UnregisteredVariant {
                family: F::FAMILY,
                type_tag: self.type_tag().to_string(),
            })?;
        let payload = self.value.to_cbor_payload()?;
        match (resolved.discriminator, payload) {
            (Discriminator::BareText, p @ CborValue::Text(_)) => Ok(p),
            (Discriminator::BareBytes, p @ CborValue::Bytes(_)) => Ok(p),
            (Discriminator::Tag(tag), p) => Ok(binary::tagged(tag, p)),
            (d, _) => Err(EncodingError::Value(format!(
                "{} payload does not match discriminator {}",
                self.type_tag(),
                d
            ))),
        }
    }

    fn decode_cbor(types: &TypeChoiceRegistry, item: CborValue) -> Result<Self, DecodeError> {
        let (discriminator, payload) = match item {
            p @ CborValue::Text(_) => (Discriminator::BareText, p),
            p @ CborValue::Bytes(_) => (Discriminator::BareBytes, p),
            CborValue::Tag(tag, inner) => (Discriminator::Tag(tag), *inner),
            other => return Err(DecodeError::unexpected("type-choice item", other)),
        };
        let resolved = types
            .resolve_by_discriminator(F::FAMILY, discriminator)
            .map_err(|_| DecodeError::UnknownVariant {
                family: F::FAMILY,
                discriminator: discriminator.to_string(),
            })?;
        let mut value = (resolved.factory)(None)?;
        value.set_cbor_payload(payload).map_err(|e| DecodeError::Variant {
            family: F::FAMILY,
            type_tag: resolved.type_tag.clone(),
            source: Box::new(e),
        })?;
        Ok(Self::from_boxed(value))
    }

    fn encode_json(&self, types: &TypeChoiceRegistry) -> Result<JsonValue, EncodingError> {
        self.value.validate()?;
        let resolved = types
            .resolve_by_type_tag(F::FAMILY, self.type_tag())
            .map_err(|_| EncodingError::UnregisteredVariant {
                family: F::FAMILY,
                type_tag: self.type_tag().to_string(),
            })?;
        let payload = self.value.to_json_payload()?;
        if resolved.discriminator == Discriminator::BareText {
            return Ok(payload);
        }
        Ok(TypeAndValue { type_tag: resolved.type_tag, value: payload }.into_json())
    }

    fn decode_json(types: &TypeChoiceRegistry, item: JsonValue) -> Result<Self, DecodeError> {
        if let JsonValue::String(_) = item {
            let resolved = types
                .resolve_by_discriminator(F::FAMILY, Discriminator::BareText)
                .map_err(|_| DecodeError::UnknownVariant {
                    family: F::FAMILY,
                    discriminator: Discriminator::BareText.to_string(),
                })?;
            let mut value = (resolved.factory)(None)?;
            value.set_json_payload(item).map_err(|e| DecodeError::Variant {
                family: F::FAMILY,
                type_tag: resolved.type_tag.clone(),
                source: Box::new(e),
            })?;
            return Ok(Self::from_boxed(value));
        }

        let envelope = TypeAndValue::from_json(item)?;
        let resolved = types
            .resolve_by_type_tag(F::FAMILY, &envelope.type_tag)
            .map_err(|_| DecodeError::UnknownVariant {
                family: F::FAMILY,
                discriminator: envelope.type_tag.clone(),
            })?;
        let mut value = (resolved.factory)(None)?;
        value.set_json_payload(envelope.value).map_err(|e| DecodeError::Variant {
            family: F::FAMILY,
            type_tag: resolved.type_tag.clone(),
            source: Box::new(e),
        })?;
        value
            .validate()
            .map_err(|source| DecodeError::InvalidVariant { type_tag: resolved.type_tag, source })?;
        Ok(Self::from_boxed(value))
    }
}

impl<F: PlainTextFamily> TypeChoice<F> {
    /// Plain-string variant. Empty input is rejected.
    pub fn plain(text: &str) -> Result<Self, ValidationError> {
        let value = PlainText(text.to_string());
        value.validate()?;
        Ok(Self::from_value(value))
    }

    /// Assert wrapper over `plain` for string literals. Panics on empty input.
    pub fn plain_asserted(text: &str) -> Self {
        match Self::plain(text) {
            Ok(v) => v,
            Err(e) => panic!("{}: {}", F::FAMILY, e),
        }
    }
}

impl<F: ChoiceFamily> WireValue for TypeChoice<F> {
    fn to_cbor(&self, cx: &Codec<'_>) -> Result<CborValue, EncodingError> {
        self.encode_cbor(cx.types())
    }

    fn from_cbor(cx: &Codec<'_>, value: CborValue) -> Result<Self, DecodeError> {
        Self::decode_cbor(cx.types(), value)
    }

    fn to_json(&self, cx: &Codec<'_>) -> Result<JsonValue, EncodingError> {
        self.encode_json(cx.types())
    }

    fn from_json(cx: &Codec<'_>, value: JsonValue) -> Result<Self, DecodeError> {
        Self::decode_json(cx.types(), value)
    }
}

impl<F: ChoiceFamily> Validate for TypeChoice<F> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.value.validate()
    }
}

impl<F: ChoiceFamily> Clone for TypeChoice<F> {
    fn clone(&self) -> Self {
        Self::from_boxed(self.value.clone_box())
    }
}

impl<F: ChoiceFamily> PartialEq for TypeChoice<F> {
    fn eq(&self, other: &Self) -> bool {
        self.value.same_as(other.value.as_ref())
    }
}

impl<F: ChoiceFamily> fmt::Debug for TypeChoice<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeChoice").field(&F::FAMILY.name()).field(&self.value).finish()
    }
}

impl<F: ChoiceFamily> fmt::Display for TypeChoice<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Built-in family markers.
pub mod families {
    use super::{ChoiceFamily, Family, PlainTextFamily};

    #[derive(Debug, Clone, Copy)]
    pub struct EntityName;
    impl ChoiceFamily for EntityName {
        const FAMILY: Family = Family::ENTITY_NAME;
    }
    impl PlainTextFamily for EntityName {}

    #[derive(Debug, Clone, Copy)]
    pub struct ClassId;
    impl ChoiceFamily for ClassId {
        const FAMILY: Family = Family::CLASS_ID;
    }

    #[derive(Debug, Clone, Copy)]
    pub struct TagId;
    impl ChoiceFamily for TagId {
        const FAMILY: Family = Family::TAG_ID;
    }
    impl PlainTextFamily for TagId {}

    #[derive(Debug, Clone, Copy)]
    pub struct CorimId;
    impl ChoiceFamily for CorimId {
        const FAMILY: Family = Family::CORIM_ID;
    }
    impl PlainTextFamily for CorimId {}
}

pub type EntityName = TypeChoice<families::EntityName>;
pub type ClassId = TypeChoice<families::ClassId>;
pub type TagId = TypeChoice<families::TagId>;
pub type CorimId = TypeChoice<families::CorimId>;
