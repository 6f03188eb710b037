//! codec/context.rs
//! The codec: drives record maps in both wire forms.
//!
//! Design notes:
//! - A `Codec` borrows the registry for type-choice resolution and holds a
//!   snapshot of the extension bindings it decodes with.
//! - Top-level `to_*` validate first and emit nothing on failure; `from_*`
//!   never validate.
//! - Fixed fields are encoded before extension fields.

use std::collections::BTreeSet;
use std::sync::Arc;

use ciborium::value::Value as CborValue;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::choice::TypeChoiceRegistry;
use crate::codec::binary::{self, CborMap};
use crate::codec::record::Record;
use crate::codec::text::{self, JsonMap};
use crate::codec::types::{CodecConfig, DecodeError, EncodingError, WireFormat};
use crate::extensions::{ExtensionMap, ExtensionShape};
use crate::profile::{Profile, ProfileId};
use crate::registry::Registry;

#[derive(Clone, Debug)]
pub struct Codec<'r> {
    registry: &'r Registry,
    bindings: Arc<ExtensionMap>,
    config: CodecConfig,
}

impl<'r> Codec<'r> {
    /// Codec over `registry`'s current process-wide bindings.
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry, bindings: registry.bindings(), config: CodecConfig::default() }
    }

    /// Decode and encode with a profile's shapes instead of the process-wide
    /// bindings.
    pub fn with_profile(mut self, profile: &Profile) -> Self {
        self.bindings = profile.extensions();
        self
    }

    pub fn with_bindings(mut self, bindings: Arc<ExtensionMap>) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn types(&self) -> &'r TypeChoiceRegistry {
        self.registry.types()
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    pub fn bindings(&self) -> &Arc<ExtensionMap> {
        &self.bindings
    }

    fn shape_for<R: Record>(&self) -> Option<Arc<ExtensionShape>> {
        R::EXTENSION_POINT.and_then(|p| self.bindings.get(p)).cloned()
    }

    /// Codec for the subtree of a record that names its own profile.
    fn scoped(&self, hint: Option<ProfileId>) -> Option<Codec<'r>> {
        let id = hint?;
        match self.registry.get_profile(&id) {
            Some(profile) => Some(self.clone().with_profile(&profile)),
            None => {
                debug!(profile = %id, "profile not registered; decoding with current bindings");
                None
            }
        }
    }

    fn skip_unknown(&self, record: &'static str, key: String) -> Result<(), DecodeError> {
        if self.config.strict {
            return Err(DecodeError::UnknownField { record, key });
        }
        debug!(record, key = %key, "skipping unknown field");
        self.registry.telemetry().record_skipped();
        Ok(())
    }

    // --- top level ---

    pub fn to_cbor<R: Record>(&self, record: &R) -> Result<Vec<u8>, EncodingError> {
        let result = record
            .validate()
            .map_err(EncodingError::from)
            .and_then(|_| self.record_to_cbor(record))
            .and_then(|v| binary::to_bytes(&v))
            .map_err(|e| e.in_record(R::NAME));
        self.registry.telemetry().record_encode(WireFormat::Binary, result.as_ref().ok().map(Vec::len));
        result
    }

    pub fn from_cbor<R: Record>(&self, data: &[u8]) -> Result<R, DecodeError> {
        let result = binary::from_bytes(data)
            .and_then(|v| self.record_from_cbor::<R>(v))
            .map_err(|e| e.in_record(R::NAME));
        self.registry.telemetry().record_decode(WireFormat::Binary, data.len(), result.is_ok());
        result
    }

    pub fn to_json<R: Record>(&self, record: &R) -> Result<Vec<u8>, EncodingError> {
        let result = record
            .validate()
            .map_err(EncodingError::from)
            .and_then(|_| self.record_to_json(record))
            .and_then(|v| text::to_bytes(&v))
            .map_err(|e| e.in_record(R::NAME));
        self.registry.telemetry().record_encode(WireFormat::Text, result.as_ref().ok().map(Vec::len));
        result
    }

    pub fn from_json<R: Record>(&self, data: &[u8]) -> Result<R, DecodeError> {
        let result = text::from_bytes(data)
            .and_then(|v| self.record_from_json::<R>(v))
            .map_err(|e| e.in_record(R::NAME));
        self.registry.telemetry().record_decode(WireFormat::Text, data.len(), result.is_ok());
        result
    }

    // --- nested records ---

    pub fn record_to_cbor<R: Record>(&self, record: &R) -> Result<CborValue, EncodingError> {
        let mut out = CborMap::new();
        record.encode_fields_cbor(self, &mut out)?;
        if let Some(set) = record.extensions() {
            set.encode_cbor(&mut out)?;
        }
        Ok(out.into_value())
    }

    pub fn record_to_json<R: Record>(&self, record: &R) -> Result<JsonValue, EncodingError> {
        let mut out = JsonMap::new();
        record.encode_fields_json(self, &mut out)?;
        if let Some(set) = record.extensions() {
            set.encode_json(&mut out)?;
        }
        Ok(JsonValue::Object(out))
    }

    pub fn record_from_cbor<R: Record>(&self, value: CborValue) -> Result<R, DecodeError> {
        let entries = binary::expect_map(value)?;
        let scoped = self.scoped(R::profile_hint_cbor(&entries));
        let cx = scoped.as_ref().unwrap_or(self);

        let shape = cx.shape_for::<R>();
        let mut record = R::default();
        if let (Some(shape), Some(set)) = (shape.as_ref(), record.extensions_mut()) {
            set.bind(Arc::clone(shape));
        }

        let mut seen = BTreeSet::new();
        for (k, v) in entries {
            let key = binary::expect_int(k)?;
            if !seen.insert(key) {
                return Err(DecodeError::DuplicateField { record: R::NAME, key: key.to_string() });
            }
            if let Some(fixed) = R::FIELDS.iter().find(|f| f.cbor == key) {
                record.decode_field_cbor(cx, key, v).map_err(|e| e.in_field(fixed.json))?;
                continue;
            }
            match shape.as_ref().and_then(|s| s.by_cbor_key(key)) {
                Some(field) => {
                    let ext = field.decode_cbor(v).map_err(|e| DecodeError::Extension {
                        key: field.key().to_string(),
                        source: Box::new(e),
                    })?;
                    if let Some(set) = record.extensions_mut() {
                        set.insert_decoded(field.key(), ext);
                    }
                }
                None => cx.skip_unknown(R::NAME, key.to_string())?,
            }
        }
        Ok(record)
    }

    pub fn record_from_json<R: Record>(&self, value: JsonValue) -> Result<R, DecodeError> {
        let members = text::expect_object(value)?;
        let scoped = self.scoped(R::profile_hint_json(&members));
        let cx = scoped.as_ref().unwrap_or(self);

        let shape = cx.shape_for::<R>();
        let mut record = R::default();
        if let (Some(shape), Some(set)) = (shape.as_ref(), record.extensions_mut()) {
            set.bind(Arc::clone(shape));
        }

        // serde_json objects cannot hold duplicate members; the last one wins
        // at parse time.
        for (name, v) in members {
            if let Some(fixed) = R::FIELDS.iter().find(|f| f.json == name) {
                record.decode_field_json(cx, &name, v).map_err(|e| e.in_field(fixed.json))?;
                continue;
            }
            match shape.as_ref().and_then(|s| s.by_json_name(&name)) {
                Some(field) => {
                    let ext = field.decode_json(v).map_err(|e| DecodeError::Extension {
                        key: field.key().to_string(),
                        source: Box::new(e),
                    })?;
                    if let Some(set) = record.extensions_mut() {
                        set.insert_decoded(field.key(), ext);
                    }
                }
                None => cx.skip_unknown(R::NAME, name)?,
            }
        }
        Ok(record)
    }
}
