//! Blob store trait for the external byte storage that holds uploaded files.
//!
//! The registry never uploads: clients push bytes straight to the blob store
//! and register the returned keys. The service only needs to delete keys and
//! read usage counters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Storage usage counters reported by the blob store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    /// Bytes stored across the whole account.
    pub total_bytes: u64,
    /// Bytes attributable to this application.
    pub app_total_bytes: u64,
    /// Number of files uploaded.
    pub files_uploaded: u64,
    /// Configured storage limit in bytes.
    pub limit_bytes: u64,
}

/// Trait for blob store backends.
///
/// Implementations live in `sharecode-storage` (UploadThing HTTP API, local
/// directory, in-memory).
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "uploadthing", "local").
    fn provider_type(&self) -> &str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Delete the given keys. Unknown keys are not an error.
    ///
    /// Returns how many keys the store reported as deleted.
    async fn delete_files(&self, keys: &[String]) -> AppResult<u64>;

    /// Read the store's usage counters.
    async fn usage(&self) -> AppResult<UsageInfo>;
}
