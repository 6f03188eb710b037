//! Extension Set.
//!
//! Design notes:
//! - Profiles attach extra fields to extensible records by binding an
//!   `ExtensionShape` to an `ExtensionPoint`.
//! - Fixed fields occupy small non-negative binary keys; extension slots are
//!   conventionally negative. Collisions are rejected when a shape is bound.
//! - Values are trait objects; `ExtensionSet::get_as` recovers the concrete
//!   type with a checked downcast.

pub mod set;
pub mod shape;
pub mod types;
pub mod values;

pub use set::*;
pub use shape::*;
pub use types::*;
