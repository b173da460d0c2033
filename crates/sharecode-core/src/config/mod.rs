//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod share;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::database::{DatabaseBackend, DatabaseConfig};
pub use self::logging::LoggingConfig;
pub use self::share::{MAX_POLICY_SECONDS, ShareConfig};
pub use self::storage::{BlobProvider, BlobStoreConfig};
pub use self::worker::SweeperConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides, e.g. `SHARECODE__SERVER__PORT`.
pub const ENV_PREFIX: &str = "SHARECODE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Share registry persistence settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// External blob store settings.
    #[serde(default)]
    pub blob_store: BlobStoreConfig,
    /// Share code and expiration policy settings.
    #[serde(default)]
    pub share: ShareConfig,
    /// Expiration sweeper schedule.
    #[serde(default)]
    pub sweeper: SweeperConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/default.toml` and `config/{env}.toml`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration from an explicit base file plus an environment overlay.
    ///
    /// Merges the base file with `config/{env}` and environment variables
    /// prefixed with `SHARECODE__`. Missing files are skipped.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the registry misbehave at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.share.default_expiration_seconds <= 0 {
            return Err(AppError::configuration(
                "share.default_expiration_seconds must be positive",
            ));
        }
        if self.share.default_expiration_seconds > self.share.max_expiration_seconds {
            return Err(AppError::configuration(
                "share.default_expiration_seconds exceeds share.max_expiration_seconds",
            ));
        }
        if self.share.max_expiration_seconds > MAX_POLICY_SECONDS {
            return Err(AppError::configuration(format!(
                "share.max_expiration_seconds may not exceed {MAX_POLICY_SECONDS}"
            )));
        }
        if !(0..=MAX_POLICY_SECONDS).contains(&self.share.one_time_blob_grace_seconds) {
            return Err(AppError::configuration(format!(
                "share.one_time_blob_grace_seconds must be between 0 and {MAX_POLICY_SECONDS}"
            )));
        }
        if self.share.code_max_attempts == 0 {
            return Err(AppError::configuration(
                "share.code_max_attempts must be at least 1",
            ));
        }
        let budget = self.blob_store.delete_budget(self.share.max_files);
        if budget.as_secs_f64() >= self.server.request_timeout_seconds as f64 {
            return Err(AppError::configuration(format!(
                "A cascade delete may take {:.1}s, which does not fit in \
                 server.request_timeout_seconds = {}",
                budget.as_secs_f64(),
                self.server.request_timeout_seconds
            )));
        }
        if self.blob_store.provider == BlobProvider::UploadThing
            && self.blob_store.api_key.trim().is_empty()
        {
            return Err(AppError::configuration(
                "blob_store.api_key is required for the uploadthing provider",
            ));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        Ok(())
    }
}
