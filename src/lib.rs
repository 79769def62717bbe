//! # Ads Report Downloader Library
//!
//! A library for extracting metrics from an asynchronous advertising
//! reporting API. The API follows the "request a report, poll until ready,
//! download and decompress the result" pattern: a report is generated
//! server-side per account, report type, and calendar date, and becomes
//! available as a gzip-compressed JSON document once generation finishes.
//!
//! ## Features
//!
//! - **Batch Job Initiation**: One report job per eligible (account,
//!   report-type) pair for each report date
//! - **Round-Based Polling**: Concurrent status checks with a bounded
//!   fan-out, a fixed inter-round sleep, and a wall-clock deadline
//! - **Retry with Backoff**: Transient HTTP failures (429, timeout,
//!   connection reset) retried with exponential backoff
//! - **Incremental Sync**: Persistent date cursor drives one slice per
//!   calendar day
//! - **Graceful Cancellation**: All blocking points honor a shared
//!   shutdown handle
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ads_report_downloader::api::AdsApiClient;
//! use ads_report_downloader::auth::StaticTokenAuthenticator;
//! use ads_report_downloader::report::{ReportInitiator, ReportPoller};
//! use ads_report_downloader::config::sponsored_display_metrics;
//! use ads_report_downloader::{Account, AccountKind, MetricRecord};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let authenticator = Arc::new(StaticTokenAuthenticator::new("token"));
//! let client = Arc::new(AdsApiClient::new(
//!     reqwest::Client::new(),
//!     "https://advertising-api.amazon.com",
//!     "my-client-id",
//!     authenticator,
//! ));
//!
//! let accounts = vec![Account::new(1, AccountKind::Seller)];
//! let initiator = ReportInitiator::new(client.clone(), accounts, sponsored_display_metrics());
//! let poller = ReportPoller::new(client);
//!
//! let jobs = initiator.initiate("20230101").await?;
//! let mut records: Vec<MetricRecord> = Vec::new();
//! let outcome = poller.poll(jobs, &mut records).await?;
//! println!("emitted {} records", outcome.records_emitted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`api`] - Authenticated HTTP execution with retry and backoff
//! - [`auth`] - Bearer-token authenticator capability
//! - [`report`] - Job initiation, status polling, download and decode
//! - [`slices`] - Date-cursor slice planning
//! - [`state`] - Persisted sync cursor
//! - [`output`] - Record sinks (JSON Lines writer)
//! - [`shutdown`] - Graceful cancellation shared across components

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Serialize};

/// Authenticated HTTP request execution
pub mod api;

/// Authenticator capability producing bearer tokens
pub mod auth;

/// CLI command implementations
pub mod cli;

/// Connector configuration
pub mod config;

/// Record output sinks
pub mod output;

/// Report job initiation, polling, and decoding
pub mod report;

/// Graceful shutdown coordination shared across modules
pub mod shutdown;

/// Date-cursor slice planning
pub mod slices;

/// Persisted sync cursor state
pub mod state;

// Re-export commonly used types
pub use report::{JobStatus, ReportJob};

/// Kind of advertising account, as reported by the profiles API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Seller account
    Seller,
    /// Vendor account
    Vendor,
    /// Agency account
    Agency,
}

/// An advertising account that reports are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier used to scope API requests
    pub id: u64,
    /// Account kind, used to filter report-type eligibility
    pub kind: AccountKind,
}

impl Account {
    /// Create a new account.
    pub fn new(id: u64, kind: AccountKind) -> Self {
        Self { id, kind }
    }
}

/// Report type requested from the reporting API.
///
/// Each type has its own submit endpoint and metric set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordType {
    /// Campaign-level metrics
    Campaigns,
    /// Ad-group-level metrics
    AdGroups,
    /// Product-ad-level metrics
    ProductAds,
    /// Targeting-expression-level metrics
    Targets,
    /// Per-ASIN purchase metrics
    Asins,
}

impl RecordType {
    /// API path segment and wire name for this report type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Campaigns => "campaigns",
            RecordType::AdGroups => "adGroups",
            RecordType::ProductAds => "productAds",
            RecordType::Targets => "targets",
            RecordType::Asins => "asins",
        }
    }

    /// Whether this report type can be generated for the given account kind.
    ///
    /// Asins reports are not available to vendor accounts; requesting one
    /// is rejected by the API, so the pair is skipped at initiation time.
    pub fn available_to(&self, kind: AccountKind) -> bool {
        !(matches!(self, RecordType::Asins) && kind == AccountKind::Vendor)
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded metric row, tagged with the job that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRecord {
    /// Account the report was generated for
    pub account_id: u64,
    /// Report type the row came from
    pub report_type: RecordType,
    /// Report date in `YYYYMMDD` format
    pub report_date: String,
    /// Raw metric row; the shape depends on the report type
    pub metric: serde_json::Value,
}
