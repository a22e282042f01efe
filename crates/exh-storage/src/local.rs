//! Local filesystem backend.
//!
//! Each blob is written to a temporary sibling, fsynced, then renamed over
//! the final path. A crash mid-write leaves either the old blob or none.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::locator::BlobLocator;
use crate::traits::{BackendType, BlobRef, BlobStore};

/// Blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalBlobStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::WriteFailed {
                locator: root.display().to_string(),
                reason: format!("failed to create root: {e}"),
            })?;
        Ok(Self {
            root,
            public_base_url: None,
        })
    }

    /// Serve URLs as `{base}/{locator}` instead of the bare locator.
    pub fn with_public_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.public_base_url = Some(base.trim_end_matches('/').to_string());
        self
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, locator: &BlobLocator) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(locator.segments());
        path
    }

    fn url_for(&self, locator: &BlobLocator) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/{locator}"),
            None => locator.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        locator: &BlobLocator,
        bytes: &[u8],
        _content_type: &str,
    ) -> StorageResult<BlobRef> {
        let write_failed = |reason: String| StorageError::WriteFailed {
            locator: locator.to_string(),
            reason,
        };
        let path = self.path_for(locator);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_failed(format!("failed to create directory: {e}")))?;
        }

        let tmp = path.with_extension("part");
        let mut file = fs::File::create(&tmp)
            .await
            .map_err(|e| write_failed(format!("failed to create file: {e}")))?;
        file.write_all(bytes)
            .await
            .map_err(|e| write_failed(format!("failed to write data: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| write_failed(format!("failed to sync file: {e}")))?;
        drop(file);
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| write_failed(format!("failed to move into place: {e}")))?;

        debug!(%locator, size = bytes.len(), "blob stored");
        Ok(BlobRef {
            locator: locator.to_string(),
            url: self.url_for(locator),
        })
    }

    async fn get(&self, locator: &BlobLocator) -> StorageResult<Vec<u8>> {
        match fs::read(self.path_for(locator)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(locator.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed {
                locator: locator.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn exists(&self, locator: &BlobLocator) -> StorageResult<bool> {
        fs::try_exists(self.path_for(locator))
            .await
            .map_err(|e| StorageError::ReadFailed {
                locator: locator.to_string(),
                reason: e.to_string(),
            })
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Local
    }
}
