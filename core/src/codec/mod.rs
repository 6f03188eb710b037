//! Dual Codec.
//!
//! Design notes:
//! - Every record has a binary (CBOR map, integer keys) and a text (JSON
//!   object, hyphenated names) form with field-for-field equivalence.
//! - `Codec` is the entry point; `binary` and `text` hold the primitives
//!   concrete schemas build on.

pub mod binary;
pub mod context;
pub mod record;
pub mod text;
pub mod types;

pub use context::*;
pub use record::*;
pub use types::*;
