//! telemetry/snapshot.rs
//! Immutable telemetry snapshot with derived ratios.

use serde::Serialize;

use crate::telemetry::counters::CodecCounters;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub counters: CodecCounters,
    /// Failed encodes over attempted encodes.
    pub encode_failure_rate: f64,
    /// Failed decodes over attempted decodes.
    pub decode_failure_rate: f64,
    /// Mean encoded size of a successfully encoded record.
    pub mean_encoded_len: f64,
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl TelemetrySnapshot {
    pub fn from(counters: &CodecCounters) -> Self {
        let encoded = counters.records_encoded();
        let decoded = counters.records_decoded();
        Self {
            counters: counters.clone(),
            encode_failure_rate: ratio(counters.encode_failures, encoded + counters.encode_failures),
            decode_failure_rate: ratio(counters.decode_failures, decoded + counters.decode_failures),
            mean_encoded_len: ratio(counters.bytes_produced, encoded),
        }
    }

    pub fn sanity_check(&self) -> bool {
        (0.0..=1.0).contains(&self.encode_failure_rate) && (0.0..=1.0).contains(&self.decode_failure_rate)
    }
}
