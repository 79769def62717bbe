//! End-to-end report cycle tests: initiate, poll, download, emit.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ads_report_downloader::api::{AdsApiClient, RetryPolicy};
use ads_report_downloader::auth::StaticTokenAuthenticator;
use ads_report_downloader::config::MetricsMap;
use ads_report_downloader::report::{ReportInitiator, ReportPoller};
use ads_report_downloader::{Account, AccountKind, MetricRecord, RecordType};

fn gzip_body(json: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn test_client(base_url: &str) -> Arc<AdsApiClient> {
    Arc::new(
        AdsApiClient::new(
            reqwest::Client::new(),
            base_url,
            "test-client-id",
            Arc::new(StaticTokenAuthenticator::new("test-token")),
        )
        .with_retry_policy(RetryPolicy {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(50),
        }),
    )
}

fn fast_poller(client: Arc<AdsApiClient>) -> ReportPoller {
    ReportPoller::new(client)
        .with_check_interval(Duration::from_millis(20))
        .with_wait_timeout(Duration::from_secs(5))
}

fn campaigns_and_asins() -> MetricsMap {
    let mut metrics = MetricsMap::new();
    metrics.insert(
        RecordType::Campaigns,
        vec!["campaignId".to_string(), "impressions".to_string()],
    );
    metrics.insert(RecordType::Asins, vec!["asin".to_string()]);
    metrics
}

const FIVE_ROWS: &str = r#"[
    {"campaignId": 1, "impressions": 10},
    {"campaignId": 2, "impressions": 20},
    {"campaignId": 3, "impressions": 30},
    {"campaignId": 4, "impressions": 40},
    {"campaignId": 5, "impressions": 50}
]"#;

#[tokio::test]
async fn test_full_cycle_emits_tagged_records() {
    let server = MockServer::start().await;

    // Seller is eligible for both types, vendor only for campaigns.
    Mock::given(method("POST"))
        .and(path_regex(r"^/sd/[a-zA-Z]+/report$"))
        .and(header("Amazon-Advertising-API-ClientId", "test-client-id"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"reportId": "r-1", "status": "IN_PROGRESS"})),
        )
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/reports/r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "location": format!("{}/v1/reports/r-1/download", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/r-1/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip_body(FIVE_ROWS)))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let accounts = vec![
        Account::new(1, AccountKind::Seller),
        Account::new(2, AccountKind::Vendor),
    ];
    let initiator = ReportInitiator::new(client.clone(), accounts, campaigns_and_asins());

    let jobs = initiator.initiate("20230101").await.unwrap();
    assert_eq!(jobs.len(), 3);
    assert!(!jobs
        .iter()
        .any(|j| j.account_id == 2 && j.report_type == RecordType::Asins));

    let mut records: Vec<MetricRecord> = Vec::new();
    let outcome = fast_poller(client).poll(jobs, &mut records).await.unwrap();

    assert_eq!(outcome.initiated, 3);
    assert_eq!(outcome.completed, 3);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.abandoned, 0);
    assert_eq!(outcome.records_emitted, 15);
    assert_eq!(records.len(), 15);

    for record in &records {
        assert_eq!(record.report_date, "20230101");
    }
    // The vendor account only ran campaigns, the seller ran both types.
    let vendor_rows = records.iter().filter(|r| r.account_id == 2).count();
    assert_eq!(vendor_rows, 5);
    let seller_asin_rows = records
        .iter()
        .filter(|r| r.account_id == 1 && r.report_type == RecordType::Asins)
        .count();
    assert_eq!(seller_asin_rows, 5);
}

#[tokio::test]
async fn test_rejected_submission_skips_pair_without_failing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sd/campaigns/report"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unsupported"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sd/asins/report"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(json!({"reportId": "r-asins", "status": "IN_PROGRESS"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let accounts = vec![Account::new(1, AccountKind::Seller)];
    let initiator = ReportInitiator::new(client, accounts, campaigns_and_asins());

    let jobs = initiator.initiate("20230102").await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].report_type, RecordType::Asins);
    assert_eq!(jobs[0].report_id, "r-asins");
}

#[tokio::test]
async fn test_failed_report_is_dropped_while_siblings_complete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/reports/r-bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "FAILURE"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/reports/r-good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "location": format!("{}/v1/reports/r-good/download", server.uri()),
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/r-good/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip_body(FIVE_ROWS)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let jobs = vec![
        ads_report_downloader::ReportJob::new("r-bad", 1, RecordType::Campaigns, "20230103"),
        ads_report_downloader::ReportJob::new("r-good", 1, RecordType::Asins, "20230103"),
    ];

    let mut records: Vec<MetricRecord> = Vec::new();
    let outcome = fast_poller(client).poll(jobs, &mut records).await.unwrap();

    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.abandoned, 0);
    assert_eq!(records.len(), 5);
}

#[tokio::test]
async fn test_corrupt_report_body_does_not_lose_sibling_records() {
    let server = MockServer::start().await;

    for id in ["r-ok", "r-corrupt"] {
        Mock::given(method("GET"))
            .and(path(format!("/v2/reports/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "SUCCESS",
                "location": format!("{}/v1/reports/{id}/download", server.uri()),
            })))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/v1/reports/r-ok/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip_body(FIVE_ROWS)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/r-corrupt/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not gzip at all".to_vec()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let jobs = vec![
        ads_report_downloader::ReportJob::new("r-ok", 1, RecordType::Campaigns, "20230104"),
        ads_report_downloader::ReportJob::new("r-corrupt", 1, RecordType::Targets, "20230104"),
    ];

    let mut records: Vec<MetricRecord> = Vec::new();
    let outcome = fast_poller(client).poll(jobs, &mut records).await.unwrap();

    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|r| r.report_type == RecordType::Campaigns));
}
