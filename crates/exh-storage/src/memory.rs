//! In-memory backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::locator::BlobLocator;
use crate::traits::{BackendType, BlobRef, BlobStore};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
}

/// Blob store held in a map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, StoredBlob>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content type recorded for a blob.
    pub fn content_type(&self, locator: &str) -> Option<String> {
        self.blobs.read().get(locator).map(|b| b.content_type.clone())
    }

    /// All locators, sorted.
    pub fn locators(&self) -> Vec<String> {
        let mut v: Vec<String> = self.blobs.read().keys().cloned().collect();
        v.sort();
        v
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        locator: &BlobLocator,
        bytes: &[u8],
        content_type: &str,
    ) -> StorageResult<BlobRef> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed {
                locator: locator.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        self.blobs.write().insert(
            locator.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(BlobRef {
            locator: locator.to_string(),
            url: format!("memory://{locator}"),
        })
    }

    async fn get(&self, locator: &BlobLocator) -> StorageResult<Vec<u8>> {
        self.blobs
            .read()
            .get(locator.as_str())
            .map(|b| b.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(locator.to_string()))
    }

    async fn exists(&self, locator: &BlobLocator) -> StorageResult<bool> {
        Ok(self.blobs.read().contains_key(locator.as_str()))
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }
}
