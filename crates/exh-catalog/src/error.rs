//! Catalog errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::Dimension;

/// Errors raised while loading or resolving reference data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No record exists for this code, or the code is malformed.
    #[error("unknown {dimension} code \"{code}\"")]
    UnknownReference { dimension: Dimension, code: String },

    /// The configured "not defined" record for a dimension is absent.
    /// Fatal configuration fault: package creation must stop.
    #[error("missing default {dimension} record \"{code}\"")]
    MissingDefault { dimension: Dimension, code: String },

    /// Seed file could not be read.
    #[error("failed to read catalog seed {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Seed file is not valid YAML for the catalog schema.
    #[error("failed to parse catalog seed {path}: {source}")]
    SeedParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Seed parsed but contains conflicting entries.
    #[error("invalid catalog seed: {0}")]
    InvalidSeed(String),
}

impl CatalogError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            Self::MissingDefault { .. } => "MISSING_DEFAULT",
            Self::Io { .. } | Self::SeedParse { .. } | Self::InvalidSeed(_) => "CATALOG_LOAD",
        }
    }
}
