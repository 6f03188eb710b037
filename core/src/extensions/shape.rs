//! extensions/shape.rs
//! Extension shapes (declared fields of one record kind) and the map that
//! binds shapes to extension points.
//!
//! Design notes:
//! - A shape owns the wire mapping of every key: binary slot and text name.
//!   Declaration order is the encode order.
//! - Shapes are shared behind `Arc`; records hold the shape they were bound
//!   with, so rebinding never reinterprets existing records.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;

use crate::codec::DecodeError;
use crate::extensions::types::{ExtensionDecode, ExtensionError, ExtensionPoint, ExtensionValue};

type CborDecoder = fn(CborValue) -> Result<Box<dyn ExtensionValue>, DecodeError>;
type JsonDecoder = fn(JsonValue) -> Result<Box<dyn ExtensionValue>, DecodeError>;

fn boxed_from_cbor<T: ExtensionDecode>(v: CborValue) -> Result<Box<dyn ExtensionValue>, DecodeError> {
    T::from_cbor(v).map(|t| Box::new(t) as Box<dyn ExtensionValue>)
}

fn boxed_from_json<T: ExtensionDecode>(v: JsonValue) -> Result<Box<dyn ExtensionValue>, DecodeError> {
    T::from_json(v).map(|t| Box::new(t) as Box<dyn ExtensionValue>)
}

/// One declared extension field.
#[derive(Clone)]
pub struct ExtensionField {
    key: String,
    cbor_key: i64,
    json_name: String,
    type_id: TypeId,
    type_name: &'static str,
    from_cbor: CborDecoder,
    from_json: JsonDecoder,
}

impl ExtensionField {
    pub fn of<T: ExtensionDecode>(key: &str, cbor_key: i64, json_name: &str) -> Self {
        Self {
            key: key.to_string(),
            cbor_key,
            json_name: json_name.to_string(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            from_cbor: boxed_from_cbor::<T>,
            from_json: boxed_from_json::<T>,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn cbor_key(&self) -> i64 {
        self.cbor_key
    }

    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn holds<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn same_type(&self, other: &ExtensionField) -> bool {
        self.type_id == other.type_id
    }

    pub fn decode_cbor(&self, v: CborValue) -> Result<Box<dyn ExtensionValue>, DecodeError> {
        (self.from_cbor)(v)
    }

    pub fn decode_json(&self, v: JsonValue) -> Result<Box<dyn ExtensionValue>, DecodeError> {
        (self.from_json)(v)
    }
}

impl fmt::Debug for ExtensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionField")
            .field("key", &self.key)
            .field("cbor_key", &self.cbor_key)
            .field("json_name", &self.json_name)
            .field("type", &self.type_name)
            .finish()
    }
}

impl PartialEq for ExtensionField {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.cbor_key == other.cbor_key
            && self.json_name == other.json_name
            && self.type_id == other.type_id
    }
}

/// Ordered declaration of the extension fields of one record kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtensionShape {
    fields: Vec<ExtensionField>,
}

impl ExtensionShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `key` at binary slot `cbor_key`; the text name is the key.
    pub fn field<T: ExtensionDecode>(self, key: &str, cbor_key: i64) -> Result<Self, ExtensionError> {
        self.push(ExtensionField::of::<T>(key, cbor_key, key))
    }

    pub fn field_named<T: ExtensionDecode>(
        self,
        key: &str,
        cbor_key: i64,
        json_name: &str,
    ) -> Result<Self, ExtensionError> {
        self.push(ExtensionField::of::<T>(key, cbor_key, json_name))
    }

    fn push(mut self, field: ExtensionField) -> Result<Self, ExtensionError> {
        for f in &self.fields {
            if f.key == field.key {
                return Err(ExtensionError::DuplicateKey { key: field.key });
            }
            if f.cbor_key == field.cbor_key {
                return Err(ExtensionError::DuplicateSlot { slot: field.cbor_key });
            }
            if f.json_name == field.json_name {
                return Err(ExtensionError::DuplicateName { name: field.json_name });
            }
        }
        self.fields.push(field);
        Ok(self)
    }

    pub fn fields(&self) -> &[ExtensionField] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn by_key(&self, key: &str) -> Option<&ExtensionField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn by_cbor_key(&self, cbor_key: i64) -> Option<&ExtensionField> {
        self.fields.iter().find(|f| f.cbor_key == cbor_key)
    }

    pub fn by_json_name(&self, name: &str) -> Option<&ExtensionField> {
        self.fields.iter().find(|f| f.json_name == name)
    }

    /// Reject fields that would shadow a fixed field of `point`.
    pub fn check_against(&self, point: ExtensionPoint) -> Result<(), ExtensionError> {
        for f in &self.fields {
            let clash = point
                .fixed_fields()
                .iter()
                .any(|fixed| fixed.cbor == f.cbor_key || fixed.json == f.json_name);
            if clash {
                return Err(ExtensionError::FixedFieldCollision { point: point.name(), key: f.key.clone() });
            }
        }
        Ok(())
    }
}

/// Shapes keyed by (canonical) extension point.
#[derive(Clone, Debug, Default)]
pub struct ExtensionMap {
    shapes: BTreeMap<ExtensionPoint, Arc<ExtensionShape>>,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape for `point`. Aliases resolve to their canonical point; a
    /// second, different shape for the same point is rejected.
    pub fn with(mut self, point: ExtensionPoint, shape: ExtensionShape) -> Result<Self, ExtensionError> {
        let point = point.canonical();
        shape.check_against(point)?;
        match self.shapes.get(&point) {
            Some(existing) if **existing == shape => Ok(self),
            Some(_) => Err(ExtensionError::DuplicatePoint { point: point.name() }),
            None => {
                self.shapes.insert(point, Arc::new(shape));
                Ok(self)
            }
        }
    }

    /// Bind `shape` to `point`, replacing any shape bound there before.
    pub fn replace(&mut self, point: ExtensionPoint, shape: ExtensionShape) -> Result<(), ExtensionError> {
        let point = point.canonical();
        shape.check_against(point)?;
        self.shapes.insert(point, Arc::new(shape));
        Ok(())
    }

    /// Merge every binding of `other` into `self`, later bindings winning.
    pub fn overlay(&mut self, other: &ExtensionMap) {
        for (point, shape) in &other.shapes {
            self.shapes.insert(*point, Arc::clone(shape));
        }
    }

    pub fn get(&self, point: ExtensionPoint) -> Option<&Arc<ExtensionShape>> {
        self.shapes.get(&point.canonical())
    }

    pub fn points(&self) -> impl Iterator<Item = ExtensionPoint> + '_ {
        self.shapes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl PartialEq for ExtensionMap {
    fn eq(&self, other: &Self) -> bool {
        self.shapes.len() == other.shapes.len()
            && self
                .shapes
                .iter()
                .all(|(p, s)| other.shapes.get(p).map_or(false, |o| **o == **s))
    }
}
