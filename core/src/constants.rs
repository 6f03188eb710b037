/// CBOR tag numbers used by the base schema (IANA CBOR tags registry).
pub mod tags {
    /// Epoch-based date/time.
    pub const EPOCH_TIME: u64 = 1;
    /// URI text string.
    pub const URI: u64 = 32;
    /// Binary UUID.
    pub const UUID: u64 = 37;
    /// BER-encoded object identifier.
    pub const OID: u64 = 111;
    /// Unsigned CoRIM map.
    pub const UNSIGNED_CORIM: u64 = 501;
    /// Encoded CoMID carried inside a CoRIM.
    pub const COMID: u64 = 506;
    /// Exact security version number.
    pub const SVN_EXACT: u64 = 552;
    /// Minimum security version number.
    pub const SVN_MIN: u64 = 553;
    /// Opaque tagged bytes.
    pub const TAGGED_BYTES: u64 = 560;
}

/// Type tags of the built-in type-choice variants (text envelope `type`).
pub mod type_tags {
    pub const STRING: &str = "string";
    pub const OID: &str = "oid";
    pub const UUID: &str = "uuid";
    pub const BYTES: &str = "bytes";
}

/// Member names of the text-form type-choice envelope.
pub const ENVELOPE_TYPE: &str = "type";
pub const ENVELOPE_VALUE: &str = "value";

/// Binary UUID length.
pub const UUID_LEN: usize = 16;
