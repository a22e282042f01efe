//! # exh-core: Foundational Types for the Exhortos Exchange Stack
//!
//! Every other crate in the workspace depends on `exh-core`; it depends on
//! nothing internal.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for protocol identifiers.** [`PackageId`],
//!    [`OriginId`] and [`Folio`] are distinct types with validated
//!    constructors. An origin id supplied by a sending court can never be
//!    passed where a tracking folio is expected.
//!
//! 2. **Digests are declared, then verified.** A sender declares optional
//!    SHA-1 and SHA-256 hex digests per file ([`DeclaredDigest`]); the
//!    receiver computes both over the uploaded bytes ([`FileDigests`]) and
//!    compares. An empty declaration means "skip that check".
//!
//! 3. **UTC at rest, local time at the edge.** All stored timestamps are
//!    `DateTime<Utc>` obtained from a [`Clock`]. Conversion to the court's
//!    local offset happens only when rendering ([`LocalZone`]).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `exh-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use digest::{sha1_hex, sha256_hex, DeclaredDigest, DigestAlgorithm, FileDigests};
pub use error::{FieldError, ValidationError};
pub use identity::{is_uuid_like, Folio, OriginId, PackageId};
pub use temporal::{
    parse_protocol_datetime, Clock, FixedClock, LocalZone, SystemClock, PROTOCOL_DATETIME_FORMAT,
};
