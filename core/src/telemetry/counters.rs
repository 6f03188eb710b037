//! telemetry/counters.rs
//! Codec counters: live atomics owned by the registry, and the plain
//! snapshot they are read into.

use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};

use bincode::{Decode, Encode};
use serde::Serialize;

use crate::codec::WireFormat;

/// Plain counters, mergeable across registries or test runs.
#[derive(Default, Clone, Debug, Encode, Decode, Serialize, PartialEq, Eq)]
pub struct CodecCounters {
    pub cbor_encoded: u64,
    pub cbor_decoded: u64,
    pub json_encoded: u64,
    pub json_decoded: u64,
    pub bytes_produced: u64,
    pub bytes_consumed: u64,
    pub encode_failures: u64,
    pub decode_failures: u64,
    pub unknown_fields_skipped: u64,
}

impl CodecCounters {
    pub fn records_encoded(&self) -> u64 {
        self.cbor_encoded + self.json_encoded
    }

    pub fn records_decoded(&self) -> u64 {
        self.cbor_decoded + self.json_decoded
    }

    pub fn merge(&mut self, other: &CodecCounters) {
        self.cbor_encoded += other.cbor_encoded;
        self.cbor_decoded += other.cbor_decoded;
        self.json_encoded += other.json_encoded;
        self.json_decoded += other.json_decoded;
        self.bytes_produced += other.bytes_produced;
        self.bytes_consumed += other.bytes_consumed;
        self.encode_failures += other.encode_failures;
        self.decode_failures += other.decode_failures;
        self.unknown_fields_skipped += other.unknown_fields_skipped;
    }
}

impl AddAssign for CodecCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

/// Live counters. Relaxed ordering: each counter is independent and only
/// read through `snapshot`.
#[derive(Default, Debug)]
pub struct CodecTelemetry {
    cbor_encoded: AtomicU64,
    cbor_decoded: AtomicU64,
    json_encoded: AtomicU64,
    json_decoded: AtomicU64,
    bytes_produced: AtomicU64,
    bytes_consumed: AtomicU64,
    encode_failures: AtomicU64,
    decode_failures: AtomicU64,
    unknown_fields_skipped: AtomicU64,
}

impl CodecTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `produced` is the output length, or `None` when encoding failed.
    pub fn record_encode(&self, format: WireFormat, produced: Option<usize>) {
        match produced {
            Some(len) => {
                let counter = match format {
                    WireFormat::Binary => &self.cbor_encoded,
                    WireFormat::Text => &self.json_encoded,
                };
                counter.fetch_add(1, Ordering::Relaxed);
                self.bytes_produced.fetch_add(len as u64, Ordering::Relaxed);
            }
            None => {
                self.encode_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_decode(&self, format: WireFormat, consumed: usize, ok: bool) {
        self.bytes_consumed.fetch_add(consumed as u64, Ordering::Relaxed);
        if !ok {
            self.decode_failures.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let counter = match format {
            WireFormat::Binary => &self.cbor_decoded,
            WireFormat::Text => &self.json_decoded,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.unknown_fields_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CodecCounters {
        CodecCounters {
            cbor_encoded: self.cbor_encoded.load(Ordering::Relaxed),
            cbor_decoded: self.cbor_decoded.load(Ordering::Relaxed),
            json_encoded: self.json_encoded.load(Ordering::Relaxed),
            json_decoded: self.json_decoded.load(Ordering::Relaxed),
            bytes_produced: self.bytes_produced.load(Ordering::Relaxed),
            bytes_consumed: self.bytes_consumed.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            unknown_fields_skipped: self.unknown_fields_skipped.load(Ordering::Relaxed),
        }
    }
}
