//! In-memory blob store provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use sharecode_core::error::AppError;
use sharecode_core::result::AppResult;
use sharecode_core::traits::blob_store::{BlobStore, UsageInfo};

/// Blob store held in memory. Keys must be registered with [`put`] to count
/// towards usage; deleting an unknown key is not an error.
///
/// [`put`]: MemoryBlobStore::put
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    blobs: Arc<DashMap<String, u64>>,
    deleted: Arc<DashMap<String, ()>>,
    available: Arc<AtomicBool>,
    limit_bytes: u64,
}

impl MemoryBlobStore {
    /// Create an empty store reporting `limit_bytes` as its limit.
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            blobs: Arc::new(DashMap::new()),
            deleted: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
            limit_bytes,
        }
    }

    /// Record a blob of `size` bytes under `key`.
    pub fn put(&self, key: impl Into<String>, size: u64) {
        self.blobs.insert(key.into(), size);
    }

    /// Whether `key` is currently stored.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }

    /// Whether a delete was ever issued for `key`.
    pub fn was_deleted(&self, key: &str) -> bool {
        self.deleted.contains_key(key)
    }

    /// Simulate an outage: while unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::external_service("In-memory blob store is unavailable"))
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new(2 * 1024 * 1024 * 1024)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn delete_files(&self, keys: &[String]) -> AppResult<u64> {
        self.check_available()?;
        let mut deleted = 0;
        for key in keys {
            self.deleted.insert(key.clone(), ());
            if self.blobs.remove(key).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn usage(&self) -> AppResult<UsageInfo> {
        self.check_available()?;
        let total_bytes = self.blobs.iter().map(|b| *b.value()).sum();
        Ok(UsageInfo {
            total_bytes,
            app_total_bytes: total_bytes,
            files_uploaded: self.blobs.len() as u64,
            limit_bytes: self.limit_bytes,
        })
    }
}
