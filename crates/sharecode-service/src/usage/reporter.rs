//! Usage reporter: a thin proxy over the blob store's usage counters.

use std::sync::Arc;

use serde::Serialize;

use sharecode_core::error::{AppError, ErrorKind};
use sharecode_core::result::AppResult;
use sharecode_core::traits::{BlobStore, UsageInfo};

use super::format::format_bytes;

/// Usage counters with display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    /// Raw counters.
    #[serde(flatten)]
    pub usage: UsageInfo,
    /// The same counters formatted for people.
    pub formatted: FormattedUsage,
}

/// Display strings for a [`UsageInfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedUsage {
    /// Account-wide usage.
    pub total: String,
    /// This application's usage.
    pub app_total: String,
    /// Storage limit.
    pub limit: String,
    /// App usage as a share of the limit, e.g. `12.34%`.
    pub percent_used: String,
}

impl From<UsageInfo> for UsageReport {
    fn from(usage: UsageInfo) -> Self {
        let percent = if usage.limit_bytes == 0 {
            0.0
        } else {
            usage.app_total_bytes as f64 / usage.limit_bytes as f64 * 100.0
        };
        Self {
            formatted: FormattedUsage {
                total: format_bytes(usage.total_bytes),
                app_total: format_bytes(usage.app_total_bytes),
                limit: format_bytes(usage.limit_bytes),
                percent_used: format!("{percent:.2}%"),
            },
            usage,
        }
    }
}

/// Reads usage from the blob store. Nothing is cached.
#[derive(Debug, Clone)]
pub struct UsageReporter {
    blobs: Arc<dyn BlobStore>,
}

impl UsageReporter {
    /// Create a new usage reporter.
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Current usage counters. Any failure is reported as an upstream
    /// failure.
    pub async fn usage(&self) -> AppResult<UsageInfo> {
        self.blobs.usage().await.map_err(|e| match e.kind {
            ErrorKind::ExternalService => e,
            _ => AppError::with_source(
                ErrorKind::ExternalService,
                "Blob store usage lookup failed",
                e,
            ),
        })
    }

    /// Current usage with display strings.
    pub async fn report(&self) -> AppResult<UsageReport> {
        self.usage().await.map(UsageReport::from)
    }
}
