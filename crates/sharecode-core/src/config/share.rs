//! Share code and expiration policy configuration.

use serde::{Deserialize, Serialize};

/// Largest expiration or grace period the registry accepts (about ten years).
pub const MAX_POLICY_SECONDS: i64 = 10 * 365 * 86_400;

/// Registry policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Expiration applied when a create request names none (24 h).
    #[serde(default = "default_expiration")]
    pub default_expiration_seconds: i64,
    /// Upper bound on caller-supplied expirations (7 days).
    #[serde(default = "default_max_expiration")]
    pub max_expiration_seconds: i64,
    /// Attempts at producing an unused code before giving up.
    #[serde(default = "default_code_attempts")]
    pub code_max_attempts: u32,
    /// Delay before the blobs of a consumed one-time share are purged.
    #[serde(default = "default_one_time_grace")]
    pub one_time_blob_grace_seconds: i64,
    /// Maximum number of files in one share.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            default_expiration_seconds: default_expiration(),
            max_expiration_seconds: default_max_expiration(),
            code_max_attempts: default_code_attempts(),
            one_time_blob_grace_seconds: default_one_time_grace(),
            max_files: default_max_files(),
        }
    }
}

fn default_expiration() -> i64 {
    86_400
}

fn default_max_expiration() -> i64 {
    7 * 86_400
}

fn default_code_attempts() -> u32 {
    5
}

fn default_one_time_grace() -> i64 {
    3_600
}

fn default_max_files() -> usize {
    30
}
