//! One-off runs of the scheduled cleanup jobs.

use sharecode_core::error::AppError;

use super::{Cli, open_context};
use crate::output;

/// Remove every expired share now
pub async fn execute_sweep(cli: &Cli) -> Result<(), AppError> {
    let ctx = open_context(cli).await?;
    let report = ctx.services.sweeper.sweep().await;
    ctx.stores.close().await;
    let report = report?;

    output::print_item(
        &report,
        &[
            ("Removed", report.removed.to_string()),
            ("Blob failures", report.blob_failures.to_string()),
            ("Failed", report.failed.to_string()),
        ],
        cli.format,
    );
    if report.blob_failures > 0 {
        output::print_warning("Some blobs were queued for a later delete; see `pending list`.");
    }
    Ok(())
}

/// Retry queued blob deletions now
pub async fn execute_reconcile(cli: &Cli) -> Result<(), AppError> {
    let ctx = open_context(cli).await?;
    let report = ctx.services.reconciler.reconcile().await;
    ctx.stores.close().await;
    let report = report?;

    output::print_item(
        &report,
        &[
            ("Purged", report.purged.to_string()),
            ("Retried later", report.retried.to_string()),
            ("Abandoned", report.abandoned.to_string()),
        ],
        cli.format,
    );
    Ok(())
}
