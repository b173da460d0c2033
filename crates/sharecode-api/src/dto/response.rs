//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sharecode_entity::share::{FileRecord, ShareEntry};
use sharecode_service::SweepReport;

/// A share entry as the browser client reads it.
///
/// Sizes are decimal strings so totals above 2^53 survive JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareEntryResponse {
    /// The share code.
    #[serde(rename = "ShareCode")]
    pub share_code: String,
    /// Files in upload order.
    #[serde(rename = "File")]
    pub files: Vec<FileResponse>,
    /// Total size in bytes.
    pub size: String,
    /// Creation instant.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Expiration instant.
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    #[serde(rename = "ExpiresIn")]
    pub expires_in: i64,
    /// Whether the entry is removed on first retrieval.
    #[serde(rename = "OneTimeCode")]
    pub one_time_code: bool,
}

/// One file of a share entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    /// Original filename.
    #[serde(rename = "Name")]
    pub name: String,
    /// Size in bytes.
    #[serde(rename = "Size")]
    pub size: String,
    /// Blob store key.
    #[serde(rename = "Key")]
    pub key: String,
}

impl From<FileRecord> for FileResponse {
    fn from(file: FileRecord) -> Self {
        Self {
            name: file.name,
            size: file.size_bytes.to_string(),
            key: file.storage_key,
        }
    }
}

impl From<ShareEntry> for ShareEntryResponse {
    fn from(entry: ShareEntry) -> Self {
        Self {
            share_code: entry.share_code.into_inner(),
            files: entry.files.into_iter().map(FileResponse::from).collect(),
            size: entry.total_size_bytes.to_string(),
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            expires_in: entry.expires_in_seconds,
            one_time_code: entry.one_time_code,
        }
    }
}

/// `DELETE /api/store` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`; a missing entry is a 404.
    pub deleted: bool,
}

/// `clearExpired` result.
#[derive(Debug, Clone, Serialize)]
pub struct ClearExpiredResponse {
    /// Summary line.
    pub message: String,
    /// Counts from the sweep.
    #[serde(flatten)]
    pub report: SweepReport,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answered, `degraded` otherwise.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since startup.
    pub uptime_seconds: u64,
    /// Share store status.
    pub store: String,
    /// Blob store status.
    pub blob_store: String,
}
