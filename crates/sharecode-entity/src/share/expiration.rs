//! Expiration policy chosen at creation time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Twenty-four hours, the lifetime of a share when the caller does not ask
/// for anything else.
pub const DEFAULT_EXPIRATION_SECONDS: i64 = 24 * 60 * 60;

/// How long an entry stays retrievable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpirationPolicy {
    /// Lifetime in seconds, measured from `created_at`.
    pub expires_in_seconds: i64,
}

impl ExpirationPolicy {
    /// Policy with an explicit lifetime in seconds.
    pub fn seconds(expires_in_seconds: i64) -> Self {
        Self { expires_in_seconds }
    }

    /// Policy with a lifetime in hours.
    pub fn hours(hours: i64) -> Self {
        Self::seconds(hours.saturating_mul(60 * 60))
    }

    /// Policy with a lifetime in days.
    pub fn days(days: i64) -> Self {
        Self::seconds(days.saturating_mul(24 * 60 * 60))
    }

    /// The expiration instant for an entry created at `created_at`.
    ///
    /// Saturates at the largest representable instant instead of overflowing.
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_seconds(self.expires_in_seconds)
            .and_then(|lifetime| created_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self::seconds(DEFAULT_EXPIRATION_SECONDS)
    }
}
