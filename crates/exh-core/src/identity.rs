//! # Protocol Identifiers
//!
//! Newtype wrappers for the three identifier namespaces of the exchange:
//!
//! - [`PackageId`]: internal primary key of a received package.
//! - [`OriginId`]: opaque id assigned by the *sending* court, unique per
//!   package kind.
//! - [`Folio`]: tracking folio minted by this system when a package's files
//!   are complete, used by the counterpart to query status.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum length of an origin id.
pub const ORIGIN_ID_MAX_LEN: usize = 48;

/// Internal identifier of an exchange package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(Uuid);

impl PackageId {
    /// Generate a new random package identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID (used when hydrating from storage).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PackageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PackageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned by the sending jurisdiction.
///
/// # Validation
///
/// Trimmed, 1 to 48 characters, ASCII alphanumerics plus `_` and `-`.
/// The character set keeps the id safe to embed in blob locators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

impl OriginId {
    /// Validate and wrap an origin id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidOriginId`] when the trimmed value is
    /// empty, longer than 48 characters, or contains other characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        let ok = !trimmed.is_empty()
            && trimmed.len() <= ORIGIN_ID_MAX_LEN
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !ok {
            return Err(ValidationError::InvalidOriginId(raw));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the origin id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OriginId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tracking folio ("folio de seguimiento").
///
/// Minted once per package on completion and never changed afterwards.
/// The token is a random UUID in lowercase hyphenated form; externally
/// supplied folios are accepted in any letter case and normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Folio(String);

impl Folio {
    /// Mint a fresh folio.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string())
    }

    /// Parse an externally supplied folio.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidFolio`] if the value is not
    /// UUID-shaped.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if !is_uuid_like(trimmed) {
            return Err(ValidationError::InvalidFolio(value.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Access the folio string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Folio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `value` is a hyphenated UUID (8-4-4-4-12 hex digits).
///
/// Braced, URN and simple forms are rejected: the protocol only ever
/// exchanges the hyphenated form.
pub fn is_uuid_like(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}
