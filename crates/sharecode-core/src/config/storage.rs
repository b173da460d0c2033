//! Blob store provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Blob store backend used for cascade deletion and usage reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobProvider {
    /// UploadThing-compatible HTTP API.
    #[default]
    #[serde(rename = "uploadthing")]
    UploadThing,
    /// Local directory where each key is a file name.
    Local,
    /// Process-local map. Development and tests only.
    Memory,
}

/// External blob store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: BlobProvider,
    /// Base URL of the HTTP API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as `X-Uploadthing-Api-Key`.
    #[serde(default)]
    pub api_key: String,
    /// Root directory for the local provider.
    #[serde(default = "default_local_root")]
    pub local_root: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Retries after the first failed delete call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries, in milliseconds.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    /// Attempts the reconciler makes on a queued key before giving up on it.
    #[serde(default = "default_max_reconcile_attempts")]
    pub max_reconcile_attempts: i32,
    /// Maximum number of keys sent in one delete call.
    #[serde(default = "default_delete_batch_size")]
    pub delete_batch_size: usize,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            provider: BlobProvider::default(),
            base_url: default_base_url(),
            api_key: String::new(),
            local_root: default_local_root(),
            request_timeout_seconds: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            max_reconcile_attempts: default_max_reconcile_attempts(),
            delete_batch_size: default_delete_batch_size(),
        }
    }
}

impl BlobStoreConfig {
    /// Longest a cascade delete of `keys` keys can take: every batch uses all
    /// its retries, each attempt runs into the timeout, plus the backoff sleeps.
    pub fn delete_budget(&self, keys: usize) -> Duration {
        let batches = keys.max(1).div_ceil(self.delete_batch_size.max(1)) as u32;
        let attempts = self.max_retries.saturating_add(1);
        let per_attempt = Duration::from_secs(self.request_timeout_seconds);
        let backoff_ms = self
            .retry_base_delay_ms
            .saturating_mul((1u64 << self.max_retries.min(32)).saturating_sub(1));

        per_attempt
            .saturating_mul(attempts)
            .saturating_add(Duration::from_millis(backoff_ms))
            .saturating_mul(batches)
    }
}

fn default_base_url() -> String {
    "https://api.uploadthing.com".to_string()
}

fn default_local_root() -> String {
    "./data/blobs".to_string()
}

fn default_request_timeout() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    200
}

fn default_max_reconcile_attempts() -> i32 {
    10
}

fn default_delete_batch_size() -> usize {
    100
}
