//! # File Digests
//!
//! Integrity checking for uploaded files. A sender declares, per file, an
//! optional SHA-1 and an optional SHA-256 hex digest. The receiver computes
//! both over the uploaded bytes and compares each declared value
//! independently. Either, both, or neither may be declared.
//!
//! ## Integrity Invariant
//!
//! Comparison is on lowercase hex. Declared values are normalized on
//! construction so that `"DEADBEEF"` and `"deadbeef"` are the same digest.
//! Length is not checked at declaration time; a digest of the wrong length
//! simply never matches.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::ValidationError;

/// Hash algorithm of a declared digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1 (40 hex characters).
    Sha1,
    /// SHA-256 (64 hex characters).
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digest declared by the sender for one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeclaredDigest {
    /// Algorithm the sender claims produced `hex`.
    pub algorithm: DigestAlgorithm,
    /// Lowercase hex string.
    pub hex: String,
}

impl DeclaredDigest {
    /// Parse a declared digest.
    ///
    /// Returns `Ok(None)` for an empty (or whitespace-only) value, meaning the
    /// sender opted out of this check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidDigest`] if the value contains
    /// non-hex characters.
    pub fn parse(algorithm: DigestAlgorithm, value: &str) -> Result<Option<Self>, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidDigest {
                algorithm: algorithm.as_str(),
                value: value.to_string(),
            });
        }
        Ok(Some(Self {
            algorithm,
            hex: trimmed.to_ascii_lowercase(),
        }))
    }

    /// Whether the computed digests of a file satisfy this declaration.
    pub fn matches(&self, actual: &FileDigests) -> bool {
        let computed = match self.algorithm {
            DigestAlgorithm::Sha1 => &actual.sha1,
            DigestAlgorithm::Sha256 => &actual.sha256,
        };
        *computed == self.hex
    }
}

impl std::fmt::Display for DeclaredDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Both digests of an uploaded file, computed in one pass over the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigests {
    /// Lowercase SHA-1 hex.
    pub sha1: String,
    /// Lowercase SHA-256 hex.
    pub sha256: String,
}

impl FileDigests {
    /// Compute SHA-1 and SHA-256 of `bytes`.
    pub fn compute(bytes: &[u8]) -> Self {
        Self {
            sha1: sha1_hex(bytes),
            sha256: sha256_hex(bytes),
        }
    }
}

/// Lowercase SHA-1 hex of raw bytes.
pub fn sha1_hex(bytes: &[u8]) -> String {
    to_hex(&Sha1::digest(bytes))
}

/// Lowercase SHA-256 hex of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
