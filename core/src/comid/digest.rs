//! comid/digest.rs
//! Measured digests: `[alg-id, bytes]` pairs in CBOR, `"alg;base64"` in JSON.

use ciborium::value::Value as CborValue;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_json::Value as JsonValue;
use sha2::{Digest as _, Sha256, Sha384, Sha512};

use crate::codec::{binary, text, DecodeError, EncodingError};
use crate::extensions::{ExtensionDecode, ExtensionValue};
use crate::utils::{b64_decode, b64_encode};
use crate::validation::{Validate, ValidationError};

/// Named Information hash algorithm registry ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u64)]
pub enum HashAlg {
    Sha256 = 1,
    Sha256_128 = 2,
    Sha384 = 7,
    Sha512 = 8,
}

impl HashAlg {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlg::Sha256 => "sha-256",
            HashAlg::Sha256_128 => "sha-256-128",
            HashAlg::Sha384 => "sha-384",
            HashAlg::Sha512 => "sha-512",
        }
    }

    pub fn from_name(name: &str) -> Option<HashAlg> {
        match name {
            "sha-256" => Some(HashAlg::Sha256),
            "sha-256-128" => Some(HashAlg::Sha256_128),
            "sha-384" => Some(HashAlg::Sha384),
            "sha-512" => Some(HashAlg::Sha512),
            _ => None,
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            HashAlg::Sha256 => 32,
            HashAlg::Sha256_128 => 16,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }

    pub fn compute(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlg::Sha256 => Sha256::digest(data).to_vec(),
            HashAlg::Sha256_128 => Sha256::digest(data)[..16].to_vec(),
            HashAlg::Sha384 => Sha384::digest(data).to_vec(),
            HashAlg::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashEntry {
    pub alg: HashAlg,
    pub value: Vec<u8>,
}

impl HashEntry {
    fn to_text(&self) -> String {
        format!("{};{}", self.alg.name(), b64_encode(&self.value))
    }

    fn from_text(s: &str) -> Result<Self, DecodeError> {
        let (name, b64) = s
            .split_once(';')
            .ok_or_else(|| DecodeError::InvalidValue(format!("digest {:?} is not \"<alg>;<base64>\"", s)))?;
        let alg = HashAlg::from_name(name)
            .ok_or_else(|| DecodeError::InvalidValue(format!("unknown hash algorithm {:?}", name)))?;
        let value = b64_decode(b64).map_err(DecodeError::InvalidValue)?;
        Ok(Self { alg, value })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Digests(Vec<HashEntry>);

impl Digests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a precomputed digest; its length must match `alg`.
    pub fn add(&mut self, alg: HashAlg, value: Vec<u8>) -> Result<&mut Self, ValidationError> {
        if value.len() != alg.digest_len() {
            return Err(ValidationError::invalid(format!(
                "{} digest must be {} bytes, got {}",
                alg.name(),
                alg.digest_len(),
                value.len()
            )));
        }
        self.0.push(HashEntry { alg, value });
        Ok(self)
    }

    /// Hash `data` with `alg` and append the result.
    pub fn add_computed(&mut self, alg: HashAlg, data: &[u8]) -> &mut Self {
        self.0.push(HashEntry { alg, value: alg.compute(data) });
        self
    }

    pub fn entries(&self) -> &[HashEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Validate for Digests {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::empty("digests"));
        }
        for (i, entry) in self.0.iter().enumerate() {
            if entry.value.len() != entry.alg.digest_len() {
                return Err(ValidationError::invalid(format!(
                    "{} digest must be {} bytes, got {}",
                    entry.alg.name(),
                    entry.alg.digest_len(),
                    entry.value.len()
                ))
                .at_index("digests", i));
            }
        }
        Ok(())
    }
}

impl ExtensionValue for Digests {
    fn to_cbor(&self) -> Result<CborValue, EncodingError> {
        binary::encode_list(&self.0, |e| {
            Ok(CborValue::Array(vec![binary::uint(u64::from(e.alg)), CborValue::Bytes(e.value.clone())]))
        })
    }

    fn to_json(&self) -> Result<JsonValue, EncodingError> {
        text::encode_list(&self.0, |e| Ok(JsonValue::String(e.to_text())))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        Validate::validate(self)
    }
}

impl ExtensionDecode for Digests {
    fn from_cbor(value: CborValue) -> Result<Self, DecodeError> {
        binary::decode_list(value, |item| {
            let mut pair = binary::expect_array(item)?.into_iter();
            let (Some(alg), Some(bytes), None) = (pair.next(), pair.next(), pair.next()) else {
                return Err(DecodeError::InvalidValue("digest must be [alg, bytes]".into()));
            };
            let id = binary::expect_uint(alg)?;
            let alg = HashAlg::try_from(id)
                .map_err(|_| DecodeError::InvalidValue(format!("unknown hash algorithm {}", id)))?;
            Ok(HashEntry { alg, value: binary::expect_bytes(bytes)? })
        })
        .map(Digests)
    }

    fn from_json(value: JsonValue) -> Result<Self, DecodeError> {
        text::decode_list(value, |item| HashEntry::from_text(&text::expect_str(item)?)).map(Digests)
    }
}
