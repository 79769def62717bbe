//! Unified HTTP client for all reporting API interactions.
//!
//! Provides authenticated GET/POST with:
//! - Per-account scope headers and bearer authorization
//! - Rate-limit (429) detection as a distinguished failure
//! - Retry with exponential backoff on transient failures
//! - Cancellable backoff sleeps

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{ApiResult, RequestError, RetryPolicy};
use crate::auth::Authenticator;
use crate::shutdown::{cancellable_sleep, SharedShutdown};

/// Header carrying the API client identifier.
const CLIENT_ID_HEADER: &str = "Amazon-Advertising-API-ClientId";

/// Header scoping a request to one advertising account.
const SCOPE_HEADER: &str = "Amazon-Advertising-API-Scope";

/// Authenticated HTTP client shared by every report component.
pub struct AdsApiClient {
    client: Client,
    base_url: String,
    client_id: String,
    authenticator: Arc<dyn Authenticator>,
    retry: RetryPolicy,
    shutdown: Option<SharedShutdown>,
}

impl AdsApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `client` - Shared reqwest client
    /// * `base_url` - API base URL (e.g., "<https://advertising-api.amazon.com>")
    /// * `client_id` - Client identifier attached to every request
    /// * `authenticator` - Capability producing bearer tokens
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            client_id: client_id.into(),
            authenticator,
            retry: RetryPolicy::default(),
            shutdown: None,
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Attach a shared shutdown handle so backoff sleeps can be aborted.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Execute an authenticated GET against an absolute URL.
    pub async fn get(&self, url: &str, account_id: u64) -> ApiResult<Response> {
        self.execute(Method::GET, url, account_id, None).await
    }

    /// Execute an authenticated POST with a JSON body against an absolute URL.
    pub async fn post_json(&self, url: &str, account_id: u64, body: &Value) -> ApiResult<Response> {
        self.execute(Method::POST, url, account_id, Some(body)).await
    }

    /// Execute a request, retrying transient failures with backoff.
    ///
    /// Retries on:
    /// - 429 rate-limit responses
    /// - Request timeouts
    /// - Connection-level failures
    ///
    /// Does not retry on other HTTP error statuses; those responses are
    /// returned to the caller, which must inspect the status code itself.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        account_id: u64,
        body: Option<&Value>,
    ) -> ApiResult<Response> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            if let Some(shutdown) = &self.shutdown {
                if shutdown.is_shutdown_requested() {
                    return Err(RequestError::Cancelled);
                }
            }

            match self.send_once(method.clone(), url, account_id, body).await {
                Ok(response) => {
                    debug!(url, attempt, "Request succeeded");
                    return Ok(response);
                }
                Err(error) if error.is_transient() => {
                    if !self.retry.allows_retry(attempt) {
                        return Err(RequestError::RetriesExhausted {
                            attempts: attempt,
                            source: Box::new(error),
                        });
                    }
                    let backoff = self.retry.delay(attempt);
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %error,
                        "Transient request failure, retrying after backoff"
                    );
                    if !cancellable_sleep(backoff, self.shutdown.as_ref()).await {
                        return Err(RequestError::Cancelled);
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Issue a single request attempt and classify the outcome.
    async fn send_once(
        &self,
        method: Method,
        url: &str,
        account_id: u64,
        body: Option<&Value>,
    ) -> ApiResult<Response> {
        let token = self.authenticator.bearer_token().await?;
        let mut request = self
            .client
            .request(method, url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .header(SCOPE_HEADER, account_id.to_string())
            .bearer_auth(token);
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(RequestError::Timeout(e.to_string())),
            Err(e) if e.is_connect() => return Err(RequestError::Connection(e.to_string())),
            Err(e) => return Err(RequestError::Network(e.to_string())),
        };

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RequestError::RateLimited);
        }

        Ok(response)
    }
}
