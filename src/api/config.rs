//! Request executor configuration constants and retry policy.

use std::time::Duration;

/// Base URL of the advertising API.
pub const DEFAULT_BASE_URL: &str = "https://advertising-api.amazon.com";

/// Maximum number of attempts for a single logical request.
pub const MAX_ATTEMPTS: u32 = 5;

/// Initial backoff delay in milliseconds; doubles per retry.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Upper bound on the backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Retry policy for transient request failures.
///
/// Wraps the HTTP call capability with a bounded exponential backoff
/// curve; both the attempt cap and the curve are parameters so tests can
/// shrink the waits.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_backoff: Duration,
    /// Upper bound applied to the backoff curve
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given failed attempt (1-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Whether another attempt is allowed after the given one failed.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
