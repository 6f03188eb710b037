// Shared fixtures: the TDX profile shapes and a reference CoMID.
#![allow(dead_code)]

use manifest_core::choice::UuidValue;
use manifest_core::comid::VersionScheme;
use manifest_core::prelude::*;
use uuid::Uuid;

pub const TDX_PROFILE: &str = "http://intel.com/tdx-profile";
pub const TAG_UUID: &str = "43BBE37F-2E61-4B33-AED3-53CFF1428B20";
pub const CLASS_OID: &str = "2.16.840.1.113741.1.2.3.4.5";

/// Binary form of `test_comid()`.
pub const GOLDEN_COMID: &str = concat!(
    "a301a1005043bbe37f2e614b33aed353cff1428b200281a30065494e54454c01d8",
    "207168747470733a2f2f696e74656c2e636f6d028301000204a1008182a100a3",
    "00d86f4c6086480186f84d01020304050171496e74656c20436f72706f726174",
    "696f6e02675444585345414d81a101a100a20065312e322e330101",
);

pub fn tdx_profile_id() -> ProfileId {
    ProfileId::parse(TDX_PROFILE).unwrap()
}

pub fn tdx_mval_shape() -> ExtensionShape {
    ExtensionShape::new()
        .field::<String>("tcbdate", -72)
        .and_then(|s| s.field::<u64>("isvsvn", -73))
        .and_then(|s| s.field::<String>("pceid", -80))
        .and_then(|s| s.field::<Vec<u8>>("miscselect", -81))
        .and_then(|s| s.field::<Vec<u8>>("attributes", -82))
        .and_then(|s| s.field::<Digests>("mrsigner", -84))
        .and_then(|s| s.field::<u64>("isvprodid", -85))
        .and_then(|s| s.field::<u64>("tcbevalnum", -86))
        .unwrap()
}

pub fn tdx_extensions() -> ExtensionMap {
    ExtensionMap::new().with(ExtensionPoint::REFERENCE_VALUE, tdx_mval_shape()).unwrap()
}

pub fn registry_with_tdx() -> Registry {
    let reg = Registry::with_builtins();
    reg.register_profile(tdx_profile_id(), tdx_extensions()).unwrap();
    reg
}

pub fn intel_entity() -> Entity {
    let mut entity = Entity::new();
    entity.set_name("INTEL").unwrap();
    entity.set_reg_id("https://intel.com").unwrap();
    entity.add_role(Role::Creator).add_role(Role::TagCreator).add_role(Role::Maintainer);
    entity
}

pub fn seam_class() -> Class {
    let mut class = Class::new();
    class.set_oid(CLASS_OID).unwrap();
    class.set_vendor("Intel Corporation").set_model("TDXSEAM");
    class
}

pub fn tag_id() -> TagId {
    TagId::from_value(UuidValue(Uuid::parse_str(TAG_UUID).unwrap()))
}

pub fn comid_with(mval: Mval) -> Comid {
    let mut comid = Comid::new();
    comid
        .set_tag_identity(tag_id(), None)
        .add_entity(intel_entity())
        .add_reference_value(ValueTriple::new(Environment::new(seam_class()), vec![Measurement::new(mval)]));
    comid
}

/// The reference CoMID: one entity, one reference value carrying a version.
pub fn test_comid() -> Comid {
    let mut mval = Mval::new();
    mval.set_version("1.2.3", VersionScheme::MultipartNumeric);
    comid_with(mval)
}

/// Measurement value with the TDX shape bound and a few extensions set.
pub fn tdx_mval() -> Mval {
    let mut mval = Mval::new();
    mval.set_svn(Svn::Exact(2));
    mval.extensions.bind(std::sync::Arc::new(tdx_mval_shape()));
    mval.extensions.set("isvsvn", 10u64).unwrap();
    mval.extensions.set("pceid", "0000".to_string()).unwrap();
    let mut signer = Digests::new();
    signer.add_computed(HashAlg::Sha256, b"mrsigner");
    mval.extensions.set("mrsigner", signer).unwrap();
    mval
}

/// First reference-value measurement of a CoMID.
pub fn first_mval(comid: &Comid) -> &Mval {
    comid.triples.reference_values[0].measurements[0].value.as_ref().unwrap()
}
