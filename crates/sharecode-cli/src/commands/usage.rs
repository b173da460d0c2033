//! Blob store usage command.

use sharecode_core::error::AppError;

use super::{Cli, open_context};
use crate::output;

/// Print blob store usage
pub async fn execute(cli: &Cli) -> Result<(), AppError> {
    let ctx = open_context(cli).await?;
    let report = ctx.services.usage.report().await;
    ctx.stores.close().await;
    let report = report?;

    output::print_item(
        &report,
        &[
            ("Total", report.formatted.total.clone()),
            ("This app", report.formatted.app_total.clone()),
            ("Limit", report.formatted.limit.clone()),
            ("Used", report.formatted.percent_used.clone()),
            ("Files uploaded", report.usage.files_uploaded.to_string()),
        ],
        cli.format,
    );
    Ok(())
}
