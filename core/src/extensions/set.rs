//! extensions/set.rs
//! Per-record container of extension values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::codec::binary::CborMap;
use crate::codec::text::JsonMap;
use crate::codec::{EncodingError, Record};
use crate::extensions::shape::{ExtensionField, ExtensionMap, ExtensionShape};
use crate::extensions::types::{ExtensionDecode, ExtensionError, ExtensionValue};
use crate::validation::ValidationError;

/// Extension values of one record, keyed by extension key.
///
/// Without a bound shape the set is an always-miss lookup: nothing can be
/// set and nothing is encoded. Entries are always a subset of the bound
/// shape's keys.
#[derive(Default)]
pub struct ExtensionSet {
    shape: Option<Arc<ExtensionShape>>,
    entries: BTreeMap<String, Box<dyn ExtensionValue>>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(shape: Arc<ExtensionShape>) -> Self {
        Self { shape: Some(shape), entries: BTreeMap::new() }
    }

    pub fn shape(&self) -> Option<&Arc<ExtensionShape>> {
        self.shape.as_ref()
    }

    /// Bind a shape. Entries the new shape does not declare with the same
    /// value type are dropped.
    pub fn bind(&mut self, shape: Arc<ExtensionShape>) {
        if let Some(old) = self.shape.as_ref() {
            if Arc::ptr_eq(old, &shape) {
                return;
            }
            self.entries.retain(|key, _| {
                let keep = match (old.by_key(key), shape.by_key(key)) {
                    (Some(a), Some(b)) => a.same_type(b),
                    _ => false,
                };
                if !keep {
                    warn!(key = %key, "rebinding extension shape dropped entry");
                }
                keep
            });
        }
        self.shape = Some(shape);
    }

    pub fn set<T: ExtensionDecode>(&mut self, key: &str, value: T) -> Result<(), ExtensionError> {
        let shape = self
            .shape
            .as_ref()
            .ok_or_else(|| ExtensionError::NoShape { key: key.to_string() })?;
        let field = shape
            .by_key(key)
            .ok_or_else(|| ExtensionError::UnknownKey { key: key.to_string() })?;
        if !field.holds::<T>() {
            return Err(ExtensionError::TypeMismatch {
                key: key.to_string(),
                expected: field.type_name(),
                found: std::any::type_name::<T>(),
            });
        }
        self.entries.insert(key.to_string(), Box::new(value));
        Ok(())
    }

    /// Store a value produced by the shape's own decoder.
    pub(crate) fn insert_decoded(&mut self, key: &str, value: Box<dyn ExtensionValue>) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Result<&dyn ExtensionValue, ExtensionError> {
        self.entries
            .get(key)
            .map(|v| v.as_ref())
            .ok_or_else(|| ExtensionError::NotFound { key: key.to_string() })
    }

    /// Typed accessor; a value of another type is a `TypeMismatch`.
    pub fn get_as<T: ExtensionValue + 'static>(&self, key: &str) -> Result<&T, ExtensionError> {
        let value = self.get(key)?;
        value.as_any().downcast_ref::<T>().ok_or_else(|| ExtensionError::TypeMismatch {
            key: key.to_string(),
            expected: std::any::type_name::<T>(),
            found: self
                .shape
                .as_ref()
                .and_then(|s| s.by_key(key))
                .map_or("unknown", |f| f.type_name()),
        })
    }

    pub fn delete(&mut self, key: &str) -> Option<Box<dyn ExtensionValue>> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate every present entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (key, value) in &self.entries {
            value.validate().map_err(|e| e.at_extension(key.as_str()))?;
        }
        Ok(())
    }

    /// Present entries in the shape's declaration order.
    fn ordered(&self) -> impl Iterator<Item = (&ExtensionField, &dyn ExtensionValue)> + '_ {
        self.shape
            .iter()
            .flat_map(|s| s.fields().iter())
            .filter_map(move |f| self.entries.get(f.key()).map(|v| (f, v.as_ref())))
    }

    pub fn encode_cbor(&self, out: &mut CborMap) -> Result<(), EncodingError> {
        for (field, value) in self.ordered() {
            let v = value.to_cbor().map_err(|e| EncodingError::Extension {
                key: field.key().to_string(),
                msg: e.to_string(),
            })?;
            out.put(field.cbor_key(), v);
        }
        Ok(())
    }

    pub fn encode_json(&self, out: &mut JsonMap) -> Result<(), EncodingError> {
        for (field, value) in self.ordered() {
            let v = value.to_json().map_err(|e| EncodingError::Extension {
                key: field.key().to_string(),
                msg: e.to_string(),
            })?;
            out.insert(field.json_name().to_string(), v);
        }
        Ok(())
    }
}

impl Clone for ExtensionSet {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            entries: self.entries.iter().map(|(k, v)| (k.clone(), v.clone_box())).collect(),
        }
    }
}

/// Equality is over entries only; the bound shape is configuration.
impl PartialEq for ExtensionSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.entries.get(k).map_or(false, |o| v.same_as(o.as_ref())))
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Bind `record`'s own set to the shape `map` holds for its point.
pub fn bind_record<R: Record>(record: &mut R, map: &ExtensionMap) {
    let Some(point) = R::EXTENSION_POINT else { return };
    let Some(shape) = map.get(point) else { return };
    if let Some(set) = record.extensions_mut() {
        set.bind(Arc::clone(shape));
    }
}
