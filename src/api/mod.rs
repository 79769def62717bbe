//! Authenticated HTTP request execution with retry and backoff.

use crate::auth::AuthError;

pub mod client;
pub mod config;

pub use client::AdsApiClient;
pub use config::RetryPolicy;

/// Request executor errors
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Server responded with HTTP 429
    #[error("rate limited (HTTP 429)")]
    RateLimited,

    /// Request timed out
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection-level failure (refused, reset, DNS)
    #[error("connection error: {0}")]
    Connection(String),

    /// Other network or protocol failure, not retried
    #[error("network error: {0}")]
    Network(String),

    /// Authenticator could not produce a token
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// A transient failure persisted through every retry attempt
    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The last transient failure observed
        #[source]
        source: Box<RequestError>,
    },

    /// Shutdown was requested while waiting to retry
    #[error("cancelled by shutdown request")]
    Cancelled,
}

impl RequestError {
    /// Whether this failure kind is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RequestError::RateLimited | RequestError::Timeout(_) | RequestError::Connection(_)
        )
    }
}

/// Result type for request executor operations
pub type ApiResult<T> = Result<T, RequestError>;
