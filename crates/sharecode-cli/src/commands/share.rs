//! Share inspection and removal commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sharecode_core::error::AppError;
use sharecode_service::GetMode;

use super::{Cli, open_context};
use crate::output;

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Show a share without consuming it
    Show {
        /// Share code
        code: String,
    },
    /// Delete a share and its blobs
    Delete {
        /// Share code
        code: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Count stored shares, expired ones included
    Count,
}

/// File display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    /// Name
    name: String,
    /// Size in bytes
    size: u64,
    /// Blob key
    key: String,
}

/// Execute share commands
pub async fn execute(args: &ShareArgs, cli: &Cli) -> Result<(), AppError> {
    let ctx = open_context(cli).await?;
    let result = run(args, cli, &ctx).await;
    ctx.stores.close().await;
    result
}

async fn run(args: &ShareArgs, cli: &Cli, ctx: &super::Context) -> Result<(), AppError> {
    let registry = &ctx.services.registry;

    match &args.command {
        ShareCommand::Show { code } => {
            let entry = registry.get_entry(code, GetMode::Probe).await?;
            output::print_item(
                &entry,
                &[
                    ("Share code", entry.share_code.to_string()),
                    ("Files", entry.file_count().to_string()),
                    ("Total size", entry.total_size_bytes.to_string()),
                    ("Created", entry.created_at.to_rfc3339()),
                    ("Expires", entry.expires_at.to_rfc3339()),
                    ("One-time", entry.one_time_code.to_string()),
                ],
                cli.format,
            );
            if cli.format == output::OutputFormat::Table {
                let rows: Vec<FileRow> = entry
                    .files
                    .iter()
                    .map(|f| FileRow {
                        name: f.name.clone(),
                        size: f.size_bytes,
                        key: f.storage_key.clone(),
                    })
                    .collect();
                output::print_list(&rows, cli.format);
            }
        }
        ShareCommand::Delete { code, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Delete share {code} and its blobs?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            if registry.delete_entry(code).await? {
                output::print_success(&format!("Share {code} deleted."));
            } else {
                return Err(AppError::not_found(format!("Share {code} not found")));
            }
        }
        ShareCommand::Count => {
            let count = registry.count().await?;
            output::print_item(
                &serde_json::json!({ "count": count }),
                &[("Shares", count.to_string())],
                cli.format,
            );
        }
    }

    Ok(())
}
