//! Profile Registry.
//!
//! Design notes:
//! - A profile bundles extension shapes (one per extension point) and an
//!   optional CoMID template.
//! - Ids are registered at most once; re-registration is an error, never an
//!   overwrite.

pub mod registry;
pub mod types;

pub use registry::*;
pub use types::*;
