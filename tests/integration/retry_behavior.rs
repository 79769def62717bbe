//! Retry and backoff behavior against a mock HTTP server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ads_report_downloader::api::{AdsApiClient, RequestError, RetryPolicy};
use ads_report_downloader::auth::StaticTokenAuthenticator;

fn client_with_policy(base_url: &str, retry: RetryPolicy) -> AdsApiClient {
    AdsApiClient::new(
        reqwest::Client::new(),
        base_url,
        "test-client-id",
        Arc::new(StaticTokenAuthenticator::new("test-token")),
    )
    .with_retry_policy(retry)
}

#[tokio::test]
async fn test_rate_limited_request_retries_until_success() {
    let server = MockServer::start().await;

    // First two attempts are throttled, the third succeeds. Mount order
    // matters: the 429 mock stops matching once exhausted.
    Mock::given(method("GET"))
        .and(path("/v2/reports/r-1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/reports/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "IN_PROGRESS"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_policy(
        &server.uri(),
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(25),
            max_backoff: Duration::from_millis(200),
        },
    );

    let started = Instant::now();
    let url = client.endpoint("/v2/reports/r-1");
    let response = client.get(&url, 1).await.unwrap();

    assert_eq!(response.status(), 200);
    // Two backoffs were slept: 25ms then 50ms.
    assert!(started.elapsed() >= Duration::from_millis(75));
}

#[tokio::test]
async fn test_retries_exhausted_carries_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/reports/r-1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_with_policy(
        &server.uri(),
        RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
        },
    );

    let url = client.endpoint("/v2/reports/r-1");
    let err = client.get(&url, 1).await.unwrap_err();
    match err {
        RequestError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*source, RequestError::RateLimited));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_failure_is_retried_then_surfaced() {
    // Nothing listens on the discard port.
    let client = client_with_policy(
        "http://127.0.0.1:9",
        RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
        },
    );

    let url = client.endpoint("/v2/reports/r-1");
    let err = client.get(&url, 1).await.unwrap_err();
    match err {
        RequestError::RetriesExhausted { attempts, source } => {
            assert_eq!(attempts, 2);
            assert!(source.is_transient());
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_status_is_returned_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/reports/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_policy(
        &server.uri(),
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(10),
        },
    );

    let url = client.endpoint("/v2/reports/missing");
    let response = client.get(&url, 1).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_shutdown_aborts_backoff_sleep() {
    use ads_report_downloader::shutdown::ShutdownCoordinator;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/reports/r-1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let shutdown = ShutdownCoordinator::shared();
    let client = client_with_policy(
        &server.uri(),
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(10),
            max_backoff: Duration::from_secs(10),
        },
    )
    .with_shutdown(shutdown.clone());

    let handle = tokio::spawn(async move {
        let url = client.endpoint("/v2/reports/r-1");
        client.get(&url, 1).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.request_shutdown();

    let started = Instant::now();
    let result = handle.await.unwrap();
    assert!(matches!(result, Err(RequestError::Cancelled)));
    // The 10s backoff was interrupted, not slept through.
    assert!(started.elapsed() < Duration::from_secs(5));
}
