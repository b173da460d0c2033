//! Expiration sweeper and reconciler schedule configuration.

use serde::{Deserialize, Serialize};

/// Background schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the in-process scheduler runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the expiration sweep.
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
    /// Cron expression (with seconds) for the orphan blob reconciler.
    #[serde(default = "default_reconcile_cron")]
    pub reconcile_cron: String,
    /// Rows fetched per sweep query.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_cron: default_sweep_cron(),
            reconcile_cron: default_reconcile_cron(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_reconcile_cron() -> String {
    "0 */15 * * * *".to_string()
}

fn default_batch_size() -> i64 {
    500
}
