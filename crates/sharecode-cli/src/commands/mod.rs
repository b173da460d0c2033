//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod pending;
pub mod share;
pub mod sweep;
pub mod usage;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use sharecode_api::{Services, build_services};
use sharecode_core::config::{AppConfig, DatabaseBackend};
use sharecode_core::error::AppError;
use sharecode_core::traits::SystemClock;
use sharecode_database::Stores;
use sharecode_service::TimeRandomCodeSource;
use sharecode_storage::BlobStoreManager;

use crate::output::{self, OutputFormat};

/// ShareCode: temporary file sharing by short code
#[derive(Debug, Parser)]
#[command(name = "sharecode", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Remove expired shares now
    Sweep,
    /// Retry queued blob deletions now
    Reconcile,
    /// Show blob store usage
    Usage,
    /// Inspect or delete a share
    Share(share::ShareArgs),
    /// Blob keys awaiting deletion
    Pending(pending::PendingArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, self).await,
            Commands::Sweep => sweep::execute_sweep(self).await,
            Commands::Reconcile => sweep::execute_reconcile(self).await,
            Commands::Usage => usage::execute(self).await,
            Commands::Share(args) => share::execute(args, self).await,
            Commands::Pending(args) => pending::execute(args, self).await,
            Commands::Config(args) => config::execute(args, self).await,
        }
    }

    /// Load the configuration selected by `--config` and `--env`
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.env)
    }
}

/// Stores and services opened from configuration.
pub struct Context {
    /// Opened stores
    pub stores: Stores,
    /// Wired services
    pub services: Services,
}

/// Helper: open the configured stores and blob store and wire the services
pub async fn open_context(cli: &Cli) -> Result<Context, AppError> {
    let config = cli.load_config()?;
    if config.database.backend == DatabaseBackend::Memory {
        output::print_warning("database.backend is 'memory'; this process sees an empty store");
    }

    let stores = Stores::open(&config.database).await?;
    let blobs = Arc::new(BlobStoreManager::new(&config.blob_store).await?);
    let services = build_services(
        &config,
        &stores,
        blobs,
        Arc::new(SystemClock),
        Arc::new(TimeRandomCodeSource::new()),
    );

    Ok(Context {
        stores,
        services,
    })
}
