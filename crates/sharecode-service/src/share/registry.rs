//! Share registry: create, look up, and delete share entries.

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use sharecode_core::config::{MAX_POLICY_SECONDS, ShareConfig};
use sharecode_core::error::AppError;
use sharecode_core::result::AppResult;
use sharecode_core::traits::Clock;
use sharecode_database::ShareStore;
use sharecode_entity::share::{ExpirationPolicy, NewShareEntry, ShareCode, ShareEntry};

use super::code::CodeSource;
use super::purge::BlobPurger;
use crate::task::run_detached;

/// How a lookup treats one-time entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetMode {
    /// A real retrieval. Consumes a one-time entry.
    #[default]
    Retrieve,
    /// Inspect without consuming.
    Probe,
}

/// Owns the share entry lifecycle.
#[derive(Debug, Clone)]
pub struct ShareRegistry {
    store: Arc<dyn ShareStore>,
    purger: Arc<BlobPurger>,
    codes: Arc<dyn CodeSource>,
    clock: Arc<dyn Clock>,
    config: ShareConfig,
}

impl ShareRegistry {
    /// Create a new share registry.
    pub fn new(
        store: Arc<dyn ShareStore>,
        purger: Arc<BlobPurger>,
        codes: Arc<dyn CodeSource>,
        clock: Arc<dyn Clock>,
        config: ShareConfig,
    ) -> Self {
        Self {
            store,
            purger,
            codes,
            clock,
            config,
        }
    }

    /// Register uploaded files under a fresh share code.
    ///
    /// Input is validated before anything is written. The code is retried on
    /// collision up to `code_max_attempts` times.
    pub async fn create_entry(&self, new: NewShareEntry) -> AppResult<ShareEntry> {
        self.validate_files(&new)?;
        let policy = self.resolve_policy(new.expiration)?;
        let now = self.clock.now();

        let mut entry = ShareEntry::assemble(
            self.codes.next_code(now)?,
            new.files,
            now,
            policy,
            new.one_time_code,
        )
        .ok_or_else(|| AppError::validation("Total file size is out of range"))?;

        for attempt in 1..=self.config.code_max_attempts {
            if attempt > 1 {
                entry.share_code = self.codes.next_code(now)?;
            }
            if self.store.insert_if_absent(&entry).await? {
                info!(
                    share_code = %entry.share_code,
                    files = entry.file_count(),
                    total_size_bytes = entry.total_size_bytes,
                    expires_at = %entry.expires_at,
                    one_time = entry.one_time_code,
                    "Share created"
                );
                return Ok(entry);
            }
            debug!(attempt, share_code = %entry.share_code, "Share code collision");
        }

        warn!(
            attempts = self.config.code_max_attempts,
            "Could not find a free share code"
        );
        Err(AppError::generation_exhausted(format!(
            "No free share code after {} attempts",
            self.config.code_max_attempts
        )))
    }

    /// Look up an entry by code.
    ///
    /// Expired entries are reported as expired even if the sweeper has not
    /// removed them yet. In [`GetMode::Retrieve`] a one-time entry is removed
    /// by the same call that returns it; concurrent callers see `NotFound`.
    pub async fn get_entry(&self, code: &str, mode: GetMode) -> AppResult<ShareEntry> {
        let code = parse_lookup_code(code)?;
        let now = self.clock.now();

        let entry = self
            .store
            .find_by_code(&code)
            .await?
            .ok_or_else(|| not_found(&code))?;

        if entry.is_expired_at(now) {
            return Err(AppError::expired(format!("Share {code} has expired")));
        }

        if !entry.one_time_code || mode == GetMode::Probe {
            return Ok(entry);
        }

        let store = Arc::clone(&self.store);
        let purger = Arc::clone(&self.purger);
        let grace = Duration::seconds(
            self.config
                .one_time_blob_grace_seconds
                .clamp(0, MAX_POLICY_SECONDS),
        );
        run_detached(async move {
            let consumed = store
                .take_one_time(&code, now)
                .await?
                .ok_or_else(|| not_found(&code))?;

            purger.defer(&consumed, grace).await;
            info!(share_code = %code, "One-time share consumed");
            Ok(consumed)
        })
        .await
    }

    /// Delete an entry and its blobs. Returns `false` if there was nothing
    /// to delete.
    ///
    /// The row goes first; blob failures are queued and never undo it. Once
    /// started, the removal and purge finish even if the caller is dropped.
    pub async fn delete_entry(&self, code: &str) -> AppResult<bool> {
        let Ok(code) = ShareCode::parse(code) else {
            return Ok(false);
        };

        let store = Arc::clone(&self.store);
        let purger = Arc::clone(&self.purger);
        run_detached(async move {
            let Some(entry) = store.remove(&code).await? else {
                return Ok(false);
            };

            let outcome = purger.purge(&entry).await;
            info!(
                share_code = %code,
                blobs_deleted = outcome.deleted,
                blobs_queued = outcome.queued,
                "Share deleted"
            );
            Ok(true)
        })
        .await
    }

    /// Number of stored entries.
    pub async fn count(&self) -> AppResult<u64> {
        self.store.count().await
    }

    fn validate_files(&self, new: &NewShareEntry) -> AppResult<()> {
        if new.files.is_empty() {
            return Err(AppError::validation("At least one file is required"));
        }
        if new.files.len() > self.config.max_files {
            return Err(AppError::validation(format!(
                "A share holds at most {} files",
                self.config.max_files
            )));
        }
        if let Some(pos) = new.files.iter().position(|f| f.storage_key.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "File {} has no storage key",
                pos + 1
            )));
        }
        Ok(())
    }

    fn resolve_policy(&self, requested: Option<ExpirationPolicy>) -> AppResult<ExpirationPolicy> {
        let policy = requested
            .unwrap_or_else(|| ExpirationPolicy::seconds(self.config.default_expiration_seconds));
        if policy.expires_in_seconds <= 0 {
            return Err(AppError::validation("Expiration must be positive"));
        }
        if policy.expires_in_seconds > self.config.max_expiration_seconds {
            return Err(AppError::validation(format!(
                "Expiration may not exceed {} seconds",
                self.config.max_expiration_seconds
            )));
        }
        Ok(policy)
    }
}

/// Malformed codes cannot match anything, so they are reported as unknown.
fn parse_lookup_code(raw: &str) -> AppResult<ShareCode> {
    ShareCode::parse(raw).map_err(|_| AppError::not_found("Share not found"))
}

fn not_found(code: &ShareCode) -> AppError {
    AppError::not_found(format!("Share {code} not found"))
}
