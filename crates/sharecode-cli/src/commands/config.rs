//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use sharecode_core::error::AppError;
use sharecode_database::connection::mask_password;

use super::Cli;
use crate::output;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration, secrets masked
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = cli.load_config()?;
            config.database.url = mask_password(&config.database.url);
            if !config.blob_store.api_key.is_empty() {
                config.blob_store.api_key = "****".to_string();
            }
            output::print_item(
                &config,
                &[
                    (
                        "Server",
                        format!("{}:{}", config.server.host, config.server.port),
                    ),
                    ("Database", format!("{:?}", config.database.backend)),
                    ("Database URL", config.database.url.clone()),
                    ("Blob store", format!("{:?}", config.blob_store.provider)),
                    (
                        "Default expiry",
                        format!("{}s", config.share.default_expiration_seconds),
                    ),
                    ("Sweep schedule", config.sweeper.sweep_cron.clone()),
                ],
                cli.format,
            );
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(_) => {
                output::print_success(&format!(
                    "Configuration '{}' ({}) is valid",
                    cli.config, cli.env
                ));
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}
