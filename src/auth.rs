//! Authenticator capability for API requests.
//!
//! Token refresh mechanics live behind the [`Authenticator`] trait so the
//! HTTP layer only sees an opaque bearer-token producer. A static
//! implementation is provided for config-supplied tokens.

use async_trait::async_trait;

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token could not be produced or refreshed
    #[error("token error: {0}")]
    TokenError(String),
}

/// Produces the bearer token attached to every API request.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Return a currently valid bearer token.
    async fn bearer_token(&self) -> Result<String, AuthError>;
}

/// Authenticator backed by a fixed, pre-issued access token.
pub struct StaticTokenAuthenticator {
    token: String,
}

impl StaticTokenAuthenticator {
    /// Create an authenticator from a pre-issued token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        if self.token.is_empty() {
            return Err(AuthError::TokenError("access token is empty".to_string()));
        }
        Ok(self.token.clone())
    }
}
