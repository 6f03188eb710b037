//! CoRIM records: the unsigned manifest that carries CoMID tags, plus the
//! signer metadata that travels with it.
//!
//! Binary tags are nested CBOR byte strings under tag 506; the text form uses
//! a `{"type": "comid", "value": {...}}` envelope per tag.

pub mod meta;
pub mod unsigned;

pub use meta::*;
pub use unsigned::*;
