//! Share code generation.
//!
//! A code is the last four base-36 digits of the current Unix time in
//! milliseconds followed by two random base-36 digits, uppercased. That is
//! not unique on its own; the registry retries on collision.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::Rng;

use sharecode_core::error::AppError;
use sharecode_core::result::AppResult;
use sharecode_entity::share::ShareCode;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TIME_DIGITS: usize = 4;
const RANDOM_DIGITS: usize = 2;

/// Source of candidate share codes.
pub trait CodeSource: Send + Sync + std::fmt::Debug + 'static {
    /// Produce a candidate code for an entry created at `now`.
    fn next_code(&self, now: DateTime<Utc>) -> AppResult<ShareCode>;
}

/// The production generator: time fragment plus random fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRandomCodeSource;

impl TimeRandomCodeSource {
    /// Create a new generator.
    pub fn new() -> Self {
        Self
    }
}

impl CodeSource for TimeRandomCodeSource {
    fn next_code(&self, now: DateTime<Utc>) -> AppResult<ShareCode> {
        let millis = now.timestamp_millis().max(0) as u64;
        let mut code = time_fragment(millis);

        let mut rng = rand::thread_rng();
        for _ in 0..RANDOM_DIGITS {
            code.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
        }

        ShareCode::parse(&code)
    }
}

/// Last four base-36 digits of `millis`, left-padded with zeros.
fn time_fragment(mut millis: u64) -> String {
    let mut digits = [b'0'; TIME_DIGITS];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(millis % 36) as usize];
        millis /= 36;
    }
    digits.iter().map(|&b| b as char).collect()
}

/// Hands out a fixed sequence of codes, then fails.
///
/// Lets tests force collisions deterministically.
#[derive(Debug, Default)]
pub struct FixedCodeSource {
    codes: Mutex<VecDeque<String>>,
}

impl FixedCodeSource {
    /// Create a source that yields `codes` in order.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl CodeSource for FixedCodeSource {
    fn next_code(&self, _now: DateTime<Utc>) -> AppResult<ShareCode> {
        let next = self
            .codes
            .lock()
            .map_err(|_| AppError::internal("Code source lock poisoned"))?
            .pop_front()
            .ok_or_else(|| AppError::internal("Fixed code source is exhausted"))?;
        ShareCode::parse(&next)
    }
}
