//! # Exchange Errors
//!
//! Every failure a public operation can report. All of them are business
//! outcomes: the HTTP layer turns each into `{success: false, message,
//! errors}` rather than a transport error, with the exception of
//! [`ExchangeError::Internal`].

use exh_catalog::{CatalogError, Dimension};
use exh_core::FieldError;
use exh_state::{LifecycleError, PackageKind, PackageState};
use exh_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The payload has one or more invalid fields. All of them are listed.
    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// A referenced package does not exist.
    #[error("{what} not found: {key}")]
    NotFound { what: &'static str, key: String },

    /// No pending declared file has this name. Covers both "already
    /// received" and "never declared".
    #[error("no pending declared file named \"{0}\" (already received or never declared)")]
    DeclarationNotFound(String),

    /// A package of this kind already uses this origin id.
    #[error("{kind} with origin id \"{origin_id}\" already exists")]
    Duplicate { kind: PackageKind, origin_id: String },

    /// The uploaded bytes do not hash to a declared digest.
    #[error("{algorithm} digest of \"{file}\" does not match the declared value")]
    Integrity {
        file: String,
        algorithm: &'static str,
        declared: String,
        actual: String,
    },

    /// The uploaded file name does not end in `.pdf`.
    #[error("unsupported file type: \"{0}\" (only .pdf files are accepted)")]
    UnsupportedFileType(String),

    /// The upload exceeds the configured size limit.
    #[error("file \"{file}\" is {size} bytes, over the {max} byte limit")]
    PayloadTooLarge { file: String, size: u64, max: u64 },

    /// The blob store failed to persist the bytes.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// A configured "not defined" catalog record is absent.
    #[error("missing default {dimension} record \"{code}\"")]
    MissingDefault { dimension: Dimension, code: String },

    /// A referenced catalog code does not exist.
    #[error("unknown {dimension} code \"{code}\"")]
    UnknownReference { dimension: Dimension, code: String },

    /// The operation is not allowed in the package's current state.
    #[error("{kind} is {state}: {reason}")]
    InvalidState {
        kind: PackageKind,
        state: PackageState,
        reason: String,
    },

    /// Wiring fault or other unexpected condition.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExchangeError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DeclarationNotFound(_) => "DECLARATION_NOT_FOUND",
            Self::Duplicate { .. } => "DUPLICATE",
            Self::Integrity { .. } => "INTEGRITY_ERROR",
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::MissingDefault { .. } => "MISSING_DEFAULT",
            Self::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a server-side fault rather than a business rejection.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Individual error lines for the response envelope.
    pub fn errors(&self) -> Vec<String> {
        match self {
            Self::Validation(fields) => fields.iter().map(ToString::to_string).collect(),
            Self::Internal(_) => vec!["an internal error occurred".to_string()],
            other => vec![other.to_string()],
        }
    }

    pub(crate) fn not_found(what: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            key: key.into(),
        }
    }
}

impl From<CatalogError> for ExchangeError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownReference { dimension, code } => {
                Self::UnknownReference { dimension, code }
            }
            CatalogError::MissingDefault { dimension, code } => {
                Self::MissingDefault { dimension, code }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<LifecycleError> for ExchangeError {
    fn from(err: LifecycleError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_field() {
        let err = ExchangeError::Validation(vec![
            FieldError::new("fojas", "must not be negative"),
            FieldError::new("archivos", "must not be empty"),
        ]);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(
            err.errors(),
            vec!["fojas: must not be negative", "archivos: must not be empty"]
        );
    }

    #[test]
    fn internal_detail_is_not_listed() {
        let err = ExchangeError::Internal("lock poisoned at 0xdead".into());
        assert!(err.is_internal());
        assert!(!err.errors()[0].contains("0xdead"));
    }

    #[test]
    fn catalog_errors_map_to_reference_variants() {
        let err: ExchangeError = CatalogError::UnknownReference {
            dimension: Dimension::Materia,
            code: "XYZ".into(),
        }
        .into();
        assert_eq!(err.code(), "UNKNOWN_REFERENCE");
        assert!(err.to_string().contains("XYZ"));

        let err: ExchangeError = CatalogError::MissingDefault {
            dimension: Dimension::Area,
            code: "ND".into(),
        }
        .into();
        assert_eq!(err.code(), "MISSING_DEFAULT");
    }

    #[test]
    fn declaration_not_found_message_covers_both_causes() {
        let msg = ExchangeError::DeclarationNotFound("a.pdf".into()).to_string();
        assert!(msg.contains("already received or never declared"));
    }
}
