//! telemetry/mod.rs
//! Codec counters and immutable snapshots.
//!
//! Design notes:
//! - The registry owns one `CodecTelemetry`; every top-level encode and
//!   decode updates it.
//! - `snapshot()` copies the atomics into a plain `CodecCounters` that can be
//!   serialized, merged and compared.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
