//! Upload locators.

use chrono::{Datelike, NaiveDate};
use exh_core::OriginId;

use crate::error::StorageError;

/// A validated, backend-relative blob path.
///
/// Segments are non-empty and never `.` or `..`, so a locator can be joined
/// onto a filesystem root without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobLocator(String);

impl BlobLocator {
    /// Locator for the `seq`-th received file of a package:
    /// `{kind}/{yyyy}/{mm}/{dd}/{originId}_{seq:04}.pdf`.
    pub fn for_upload(kind: &str, date: NaiveDate, origin_id: &OriginId, seq: usize) -> Self {
        Self(format!(
            "{kind}/{:04}/{:02}/{:02}/{}_{seq:04}.pdf",
            date.year(),
            date.month(),
            date.day(),
            origin_id.as_str(),
        ))
    }

    /// Validate an arbitrary locator string.
    pub fn parse(value: &str) -> Result<Self, StorageError> {
        let invalid = || StorageError::InvalidLocator(value.to_string());
        if value.is_empty() || value.starts_with('/') || value.contains('\\') {
            return Err(invalid());
        }
        let ok = value
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
        if !ok {
            return Err(invalid());
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
