//! Blob store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;
use crate::locator::BlobLocator;

/// Content type of every accepted upload.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Where a stored blob lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRef {
    /// Backend-relative locator.
    pub locator: String,
    /// URL a client can use to fetch the blob.
    pub url: String,
}

/// Backend type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendType {
    Local,
    Memory,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable byte storage addressed by locator.
///
/// `put` must not return `Ok` until the bytes would survive a crash. Writing
/// the same locator twice replaces the earlier blob.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug {
    /// Store `bytes` at `locator`.
    async fn put(
        &self,
        locator: &BlobLocator,
        bytes: &[u8],
        content_type: &str,
    ) -> StorageResult<BlobRef>;

    /// Read a blob back.
    async fn get(&self, locator: &BlobLocator) -> StorageResult<Vec<u8>>;

    /// Whether a blob exists at `locator`.
    async fn exists(&self, locator: &BlobLocator) -> StorageResult<bool>;

    /// Backend identifier, for logs and readiness output.
    fn backend_type(&self) -> BackendType;
}
