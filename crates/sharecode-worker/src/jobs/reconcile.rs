//! Blob reconciliation job handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use sharecode_service::BlobReconciler;

use super::BLOB_RECONCILE;
use crate::executor::{JobExecutionError, JobHandler};

/// Retries queued blob deletions
#[derive(Debug)]
pub struct ReconcileJobHandler {
    reconciler: Arc<BlobReconciler>,
}

impl ReconcileJobHandler {
    /// Create a new reconcile job handler
    pub fn new(reconciler: Arc<BlobReconciler>) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl JobHandler for ReconcileJobHandler {
    fn job_type(&self) -> &str {
        BLOB_RECONCILE
    }

    async fn execute(&self) -> Result<Value, JobExecutionError> {
        let report = self.reconciler.reconcile().await.map_err(|e| {
            JobExecutionError::Transient(format!("Blob reconciliation failed: {e}"))
        })?;

        Ok(serde_json::json!({
            "task": BLOB_RECONCILE,
            "purged": report.purged,
            "retried": report.retried,
            "abandoned": report.abandoned,
        }))
    }
}
