//! Job executor: dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use sharecode_core::error::AppError;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Get the job type this handler processes
    fn job_type(&self) -> &str;

    /// Run the job once and describe what it did
    async fn execute(&self) -> Result<Value, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure; the next scheduled run may succeed
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// What happened when a job was triggered
#[derive(Debug)]
pub enum JobRun {
    /// The handler ran to completion
    Completed(Value),
    /// The previous run of the same job was still going
    Skipped,
}

#[derive(Debug)]
struct Registration {
    handler: Arc<dyn JobHandler>,
    running: Arc<Mutex<()>>,
}

/// Dispatches jobs to the appropriate handler based on job type
#[derive(Debug, Default)]
pub struct JobExecutor {
    /// Registered job handlers by type
    handlers: HashMap<String, Registration>,
}

impl JobExecutor {
    /// Create a new job executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let job_type = handler.job_type().to_string();
        tracing::info!(job_type = %job_type, "Registered job handler");
        self.handlers.insert(
            job_type,
            Registration {
                handler,
                running: Arc::new(Mutex::new(())),
            },
        );
    }

    /// Run a job by type. A trigger that arrives while the same job is still
    /// running is skipped.
    pub async fn execute(&self, job_type: &str) -> Result<JobRun, JobExecutionError> {
        let registration = self.handlers.get(job_type).ok_or_else(|| {
            JobExecutionError::Permanent(format!(
                "No handler registered for job type '{job_type}'"
            ))
        })?;

        let Ok(_guard) = registration.running.try_lock() else {
            tracing::debug!(job_type, "Previous run still in progress; skipping");
            return Ok(JobRun::Skipped);
        };

        let started = Instant::now();
        let result = registration.handler.execute().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(summary) => {
                tracing::debug!(job_type, elapsed_ms, %summary, "Job completed");
            }
            Err(e) => {
                tracing::error!(job_type, elapsed_ms, error = %e, "Job failed");
            }
        }
        result.map(JobRun::Completed)
    }

    /// Check if a handler is registered for a job type
    pub fn has_handler(&self, job_type: &str) -> bool {
        self.handlers.contains_key(job_type)
    }

    /// Get the list of registered job types
    pub fn registered_types(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Default)]
    struct SlowJob {
        runs: AtomicU32,
    }

    #[async_trait]
    impl JobHandler for SlowJob {
        fn job_type(&self) -> &str {
            "slow"
        }

        async fn execute(&self) -> Result<Value, JobExecutionError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(serde_json::json!({ "done": true }))
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_permanent_failure() {
        let executor = JobExecutor::new();
        let err = executor.execute("nope").await.unwrap_err();
        assert!(matches!(err, JobExecutionError::Permanent(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_trigger_is_skipped() {
        let job = Arc::new(SlowJob::default());
        let mut executor = JobExecutor::new();
        executor.register(job.clone());
        let executor = Arc::new(executor);

        let first = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.execute("slow").await })
        };
        tokio::task::yield_now().await;

        let second = executor.execute("slow").await.unwrap();
        assert!(matches!(second, JobRun::Skipped));

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, JobRun::Completed(_)));
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);
    }
}
