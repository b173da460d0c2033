//! Expiration sweep job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use sharecode_service::ExpirationSweeper;

use super::EXPIRATION_SWEEP;
use crate::executor::{JobExecutionError, JobHandler};

/// Runs the expiration sweeper
#[derive(Debug)]
pub struct SweepJobHandler {
    sweeper: Arc<ExpirationSweeper>,
}

impl SweepJobHandler {
    /// Create a new sweep job handler
    pub fn new(sweeper: Arc<ExpirationSweeper>) -> Self {
        Self { sweeper }
    }
}

#[async_trait]
impl JobHandler for SweepJobHandler {
    fn job_type(&self) -> &str {
        EXPIRATION_SWEEP
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let report = self
            .sweeper
            .sweep()
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Expiration sweep failed: {e}")))?;

        Ok(serde_json::json!({
            "task": EXPIRATION_SWEEP,
            "removed": report.removed,
            "blob_failures": report.blob_failures,
            "failed": report.failed,
        }))
    }
}
