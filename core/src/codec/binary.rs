//! codec/binary.rs
//! CBOR primitives for the binary wire form.
//!
//! Design notes:
//! - Records are maps with integer keys; entries are emitted in the order
//!   they were pushed, which makes the output deterministic.
//! - `expect_*` helpers consume a value and fail with `UnexpectedType`.
//! - `from_bytes` reads exactly one item; anything after it is an error.

use ciborium::value::{Integer, Value as CborValue};

use crate::codec::types::{DecodeError, EncodingError, WireFormat};

/// Ordered integer-keyed map under construction.
#[derive(Debug, Default)]
pub struct CborMap(Vec<(CborValue, CborValue)>);

impl CborMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: i64, value: CborValue) {
        self.0.push((CborValue::Integer(Integer::from(key)), value));
    }

    pub fn put_opt(&mut self, key: i64, value: Option<CborValue>) {
        if let Some(v) = value {
            self.put(key, v);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> CborValue {
        CborValue::Map(self.0)
    }
}

pub fn uint(n: u64) -> CborValue {
    CborValue::Integer(Integer::from(n))
}

pub fn text(s: &str) -> CborValue {
    CborValue::Text(s.to_string())
}

pub fn tagged(tag: u64, inner: CborValue) -> CborValue {
    CborValue::Tag(tag, Box::new(inner))
}

pub fn to_bytes(value: &CborValue) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).map_err(|e| EncodingError::Serialize {
        format: WireFormat::Binary,
        msg: e.to_string(),
    })?;
    Ok(out)
}

pub fn from_bytes(data: &[u8]) -> Result<CborValue, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::Malformed { format: WireFormat::Binary, msg: "empty input".into() });
    }
    let mut rest = data;
    let value = ciborium::de::from_reader(&mut rest).map_err(|e| DecodeError::Malformed {
        format: WireFormat::Binary,
        msg: e.to_string(),
    })?;
    if !rest.is_empty() {
        return Err(DecodeError::TrailingData { format: WireFormat::Binary, count: rest.len() });
    }
    Ok(value)
}

pub fn expect_text(v: CborValue) -> Result<String, DecodeError> {
    match v {
        CborValue::Text(s) => Ok(s),
        other => Err(DecodeError::unexpected("text string", other)),
    }
}

pub fn expect_bytes(v: CborValue) -> Result<Vec<u8>, DecodeError> {
    match v {
        CborValue::Bytes(b) => Ok(b),
        other => Err(DecodeError::unexpected("byte string", other)),
    }
}

pub fn expect_uint(v: CborValue) -> Result<u64, DecodeError> {
    match v {
        CborValue::Integer(i) => {
            u64::try_from(i).map_err(|_| DecodeError::InvalidValue("negative integer".into()))
        }
        other => Err(DecodeError::unexpected("unsigned integer", other)),
    }
}

pub fn expect_int(v: CborValue) -> Result<i64, DecodeError> {
    match v {
        CborValue::Integer(i) => {
            i64::try_from(i).map_err(|_| DecodeError::InvalidValue("integer out of range".into()))
        }
        other => Err(DecodeError::unexpected("integer", other)),
    }
}

pub fn expect_array(v: CborValue) -> Result<Vec<CborValue>, DecodeError> {
    match v {
        CborValue::Array(items) => Ok(items),
        other => Err(DecodeError::unexpected("array", other)),
    }
}

pub fn expect_map(v: CborValue) -> Result<Vec<(CborValue, CborValue)>, DecodeError> {
    match v {
        CborValue::Map(entries) => Ok(entries),
        other => Err(DecodeError::unexpected("map", other)),
    }
}

/// Strip an expected tag and return the enclosed item.
pub fn expect_tag(v: CborValue, tag: u64) -> Result<CborValue, DecodeError> {
    match v {
        CborValue::Tag(t, inner) if t == tag => Ok(*inner),
        CborValue::Tag(t, _) => Err(DecodeError::InvalidValue(format!("expected tag {}, found tag {}", tag, t))),
        other => Err(DecodeError::unexpected("tagged item", other)),
    }
}

/// Decode an array with `f`, wrapping element failures with their index.
pub fn decode_list<T>(
    v: CborValue,
    mut f: impl FnMut(CborValue) -> Result<T, DecodeError>,
) -> Result<Vec<T>, DecodeError> {
    expect_array(v)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| f(item).map_err(|e| e.at_index(i)))
        .collect()
}

/// Encode a slice with `f` into an array.
pub fn encode_list<T>(
    items: &[T],
    mut f: impl FnMut(&T) -> Result<CborValue, EncodingError>,
) -> Result<CborValue, EncodingError> {
    items.iter().map(&mut f).collect::<Result<Vec<_>, _>>().map(CborValue::Array)
}
