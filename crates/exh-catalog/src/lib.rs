//! # exh-catalog: Reference Data
//!
//! The exchange core never owns catalog data. It consumes a read-only
//! [`CatalogStore`] through the [`ReferenceResolver`], which adds the
//! protocol's code normalization rules on top:
//!
//! - INEGI geographic codes are zero-padded to fixed width (estado to two
//!   digits, municipio to three) before lookup.
//! - Routing area and authority may be omitted by the sender, in which case
//!   the deployment's configured "not defined" record is used. A missing
//!   default is a configuration fault, never silently skipped.
//!
//! [`InMemoryCatalog`] is the bundled store, loaded from a YAML seed file.

pub mod codes;
pub mod error;
pub mod resolver;
pub mod store;

pub use codes::{pad_estado, pad_municipio, ESTADO_WIDTH, MUNICIPIO_WIDTH};
pub use error::CatalogError;
pub use resolver::{ReferenceDefaults, ReferenceResolver, ResolvedMunicipio};
pub use store::{CatalogEntry, CatalogStore, Dimension, InMemoryCatalog};
