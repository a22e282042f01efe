//! # Error Hierarchy
//!
//! Validation errors for the protocol newtypes, plus [`FieldError`], the
//! field-scoped error record that the validation pipeline accumulates and
//! returns to the sending court in a single response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised by the validated constructors in this crate.
///
/// Each variant carries the rejected input so that the sender can correct it
/// without guesswork.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Origin id is empty, too long, or contains characters outside
    /// `[A-Za-z0-9_-]`.
    #[error("invalid origin id: \"{0}\" (expected 1-48 characters of A-Z, a-z, 0-9, '_' or '-')")]
    InvalidOriginId(String),

    /// Folio is not a UUID-shaped token.
    #[error("invalid folio: \"{0}\" (expected a UUID such as 7f0c2a9e-3b1d-4c55-9e5f-0a1b2c3d4e5f)")]
    InvalidFolio(String),

    /// A declared digest contains non-hex characters.
    #[error("invalid {algorithm} digest: \"{value}\" (expected hexadecimal characters only)")]
    InvalidDigest {
        /// Algorithm name ("sha1" or "sha256").
        algorithm: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Date-time string does not match the protocol format.
    #[error("invalid date-time: \"{value}\" (expected {expected})")]
    InvalidDateTime {
        /// The rejected value.
        value: String,
        /// The required format, e.g. `YYYY-MM-DDTHH:MM:SS`.
        expected: &'static str,
    },

    /// UTC offset configuration string could not be parsed.
    #[error("invalid UTC offset: \"{0}\" (expected +HH:MM or -HH:MM)")]
    InvalidUtcOffset(String),
}

impl ValidationError {
    /// Attach this error to a payload field path.
    pub fn at(self, field: impl Into<String>) -> FieldError {
        FieldError::new(field, self.to_string())
    }
}

/// A single validation failure scoped to a payload field.
///
/// Field paths use the wire names of the protocol, with list positions in
/// brackets: `archivos[2].nombreArchivo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Wire path of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_id_error_mentions_value() {
        let err = ValidationError::InvalidOriginId("a b".to_string());
        assert!(err.to_string().contains("\"a b\""));
    }

    #[test]
    fn at_scopes_error_to_field() {
        let fe = ValidationError::InvalidFolio("x".to_string()).at("folioSeguimiento");
        assert_eq!(fe.field, "folioSeguimiento");
        assert!(fe.message.contains("invalid folio"));
        assert_eq!(fe.to_string(), format!("folioSeguimiento: {}", fe.message));
    }

    #[test]
    fn field_error_serializes_flat() {
        let fe = FieldError::new("archivos", "must not be empty");
        let json = serde_json::to_value(&fe).unwrap();
        assert_eq!(json["field"], "archivos");
        assert_eq!(json["message"], "must not be empty");
    }
}
