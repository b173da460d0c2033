//! Blob store usage reporting.

pub mod format;
pub mod reporter;

pub use format::format_bytes;
pub use reporter::{FormattedUsage, UsageReport, UsageReporter};
