//! Share code value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use sharecode_core::AppError;

/// Length of codes produced by the generator.
pub const GENERATED_CODE_LEN: usize = 6;

/// Longest code accepted on input.
pub const MAX_CODE_LEN: usize = 32;

/// The short human-typable identifier handed to the sharer.
///
/// Generated codes are six uppercase base-36 characters. Lookups accept any
/// 1..=32 ASCII alphanumerics and match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct ShareCode(String);

impl ShareCode {
    /// Validate and wrap a code received from a caller.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.is_empty() || raw.len() > MAX_CODE_LEN {
            return Err(AppError::validation(format!(
                "Share code must be 1 to {MAX_CODE_LEN} characters"
            )));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::validation(
                "Share code may only contain letters and digits",
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShareCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ShareCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
