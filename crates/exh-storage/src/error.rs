//! Storage errors.

use thiserror::Error;

/// Errors raised by blob backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The bytes could not be made durable.
    #[error("failed to write blob {locator}: {reason}")]
    WriteFailed { locator: String, reason: String },

    /// The blob could not be read back.
    #[error("failed to read blob {locator}: {reason}")]
    ReadFailed { locator: String, reason: String },

    /// No blob at this locator.
    #[error("blob not found: {0}")]
    NotFound(String),

    /// Locator is empty, absolute, or escapes the store root.
    #[error("invalid blob locator \"{0}\"")]
    InvalidLocator(String),
}

/// Convenience alias.
pub type StorageResult<T> = Result<T, StorageError>;
