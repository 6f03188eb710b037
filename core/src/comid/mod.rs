//! CoMID records: tags, entities, environments and measurements.
//!
//! Design notes:
//! - Each map-encoded record implements `Record`; the extensible ones
//!   (`Comid`, `Entity`, `Triples`, `Class`, `Mval`) carry an `ExtensionSet`.
//! - Optional fields are `Option`s: absent on the wire decodes to `None`,
//!   present-but-empty decodes fine and fails `validate()`.

pub mod class;
pub mod digest;
pub mod entity;
pub mod measurement;
pub mod tag;
pub mod triples;

pub use class::*;
pub use digest::*;
pub use entity::*;
pub use measurement::*;
pub use tag::*;
pub use triples::*;

use crate::extensions::ExtensionPoint;

/// Extension points of the CoMID records.
///
/// `reference-value` and `endorsed-value` are aliases of `mval`: measurement
/// extensions always live on the measurement value record, wherever they are
/// declared.
impl ExtensionPoint {
    pub const COMID: ExtensionPoint = ExtensionPoint::new("comid", COMID_FIELDS);
    pub const ENTITY: ExtensionPoint = ExtensionPoint::new("entity", ENTITY_FIELDS);
    pub const TRIPLES: ExtensionPoint = ExtensionPoint::new("triples", TRIPLES_FIELDS);
    pub const CLASS: ExtensionPoint = ExtensionPoint::new("class", CLASS_FIELDS);
    pub const MVAL: ExtensionPoint = ExtensionPoint::new("mval", MVAL_FIELDS);

    pub const REFERENCE_VALUE: ExtensionPoint = ExtensionPoint::alias("reference-value", &ExtensionPoint::MVAL);
    pub const ENDORSED_VALUE: ExtensionPoint = ExtensionPoint::alias("endorsed-value", &ExtensionPoint::MVAL);
}
