//! manifest-core
//!
//! Extensible dual-format codec for attestation manifests (CoRIM / CoMID).
//! One data model, two wire forms: CBOR for binary, JSON for text.
//! No I/O, no async.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Framework
pub mod choice;
pub mod codec;
pub mod extensions;
pub mod profile;
pub mod registry;
pub mod telemetry;
pub mod validation;

// Schemas
pub mod comid;
pub mod corim;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::choice::{
        ChoiceError, ClassId, CorimId, Discriminator, EntityName, Family, RegistrationError, Seed, TagId,
        TypeChoice, TypeChoiceRegistry, TypeChoiceValue,
    };
    pub use crate::codec::{Codec, CodecConfig, DecodeError, EncodingError, Record, WireFormat};
    pub use crate::comid::{
        Class, Comid, Digests, Entity, Environment, HashAlg, Measurement, Mval, Role, Svn, ValueTriple, Version,
    };
    pub use crate::corim::{Meta, Signer, UnsignedCorim, Validity};
    pub use crate::extensions::{
        Extensible, ExtensionDecode, ExtensionError, ExtensionMap, ExtensionPoint, ExtensionSet, ExtensionShape,
        ExtensionValue,
    };
    pub use crate::profile::{Profile, ProfileError, ProfileId};
    pub use crate::registry::Registry;
    pub use crate::types::ManifestError;
    pub use crate::validation::{Validate, ValidationError};
}
