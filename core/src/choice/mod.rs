//! Type-Choice Registry.
//!
//! Design notes:
//! - A family is an open set of variants; each variant reports its own type
//!   tag and is selected in the binary form by a `Discriminator`.
//! - `TypeChoice<F>` is the owned, typed handle records store.

pub mod builtins;
pub mod registry;
pub mod types;
pub mod value;

pub use builtins::*;
pub use registry::*;
pub use types::*;
pub use value::*;
