//! validation/mod.rs
//! Per-record validity contracts composed bottom-up through the record graph.
//!
//! Design notes:
//! - Every record exposes `validate()`; composites call their children in
//!   declaration order and stop at the first failure.
//! - Mandatory-field presence is checked before any child recursion.
//! - Failures carry the path from the record being validated down to the
//!   offending field, built up as the error crosses each composition level.

pub mod types;

pub use types::*;
