//! Pending blob deletion queue commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use sharecode_core::error::AppError;
use sharecode_entity::blob::PendingBlobDeletion;

use super::{Cli, open_context};
use crate::output;

/// Arguments for pending commands
#[derive(Debug, Args)]
pub struct PendingArgs {
    /// Pending subcommand
    #[command(subcommand)]
    pub command: PendingCommand,
}

/// Pending subcommands
#[derive(Debug, Subcommand)]
pub enum PendingCommand {
    /// List queued blob deletions, soonest first
    List {
        /// Maximum rows to show
        #[arg(short, long, default_value_t = 50)]
        limit: i64,
    },
    /// Count queued blob deletions
    Count,
}

/// Queue display row for table output
#[derive(Debug, Serialize, Tabled)]
struct PendingRow {
    /// Blob key
    key: String,
    /// Share the blob belonged to
    share: String,
    /// Why it was queued
    reason: String,
    /// Failed attempts
    attempts: i32,
    /// Next attempt
    not_before: String,
    /// Last error
    last_error: String,
}

impl From<PendingBlobDeletion> for PendingRow {
    fn from(row: PendingBlobDeletion) -> Self {
        Self {
            key: row.storage_key,
            share: row.share_code.unwrap_or_default(),
            reason: row.reason.to_string(),
            attempts: row.attempts,
            not_before: row.not_before.to_rfc3339(),
            last_error: row.last_error.unwrap_or_default(),
        }
    }
}

/// Execute pending commands
pub async fn execute(args: &PendingArgs, cli: &Cli) -> Result<(), AppError> {
    let ctx = open_context(cli).await?;
    let queue = &ctx.stores.deletions;

    let result = match &args.command {
        PendingCommand::List { limit } => queue.list(*limit).await.map(|rows| {
            let rows: Vec<PendingRow> = rows.into_iter().map(PendingRow::from).collect();
            output::print_list(&rows, cli.format);
        }),
        PendingCommand::Count => queue.count().await.map(|count| {
            output::print_item(
                &serde_json::json!({ "count": count }),
                &[("Pending deletions", count.to_string())],
                cli.format,
            );
        }),
    };

    ctx.stores.close().await;
    result
}
