//! Report job initiation.

use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::AdsApiClient;
use crate::config::MetricsMap;
use crate::report::config::{init_endpoint, TACTIC};
use crate::report::job::{ReportInitResponse, ReportJob};
use crate::report::{ReportError, ReportResult};
use crate::Account;

/// Submits report-generation requests for every eligible
/// (account, report-type) pair of a report date.
pub struct ReportInitiator {
    client: Arc<AdsApiClient>,
    accounts: Vec<Account>,
    metrics_map: MetricsMap,
}

impl ReportInitiator {
    /// Create an initiator over the configured account set and metrics map.
    pub fn new(client: Arc<AdsApiClient>, accounts: Vec<Account>, metrics_map: MetricsMap) -> Self {
        Self {
            client,
            accounts,
            metrics_map,
        }
    }

    /// Submit one generation request per eligible pair and return the
    /// batch of accepted jobs.
    ///
    /// Pairs whose report type is structurally unavailable to the account
    /// kind are skipped up front. A submit response other than 202
    /// Accepted is logged and skipped; that report is simply omitted for
    /// this date. Transient HTTP failures surface as errors once the
    /// executor's retries are exhausted.
    pub async fn initiate(&self, report_date: &str) -> ReportResult<Vec<ReportJob>> {
        let mut jobs = Vec::new();

        for account in &self.accounts {
            for (record_type, metrics) in &self.metrics_map {
                if !record_type.available_to(account.kind) {
                    debug!(
                        account_id = account.id,
                        report_type = %record_type,
                        "Report type not available to this account kind, skipping"
                    );
                    continue;
                }

                let body = json!({
                    "reportDate": report_date,
                    "tactic": TACTIC,
                    "metrics": metrics.join(","),
                });

                info!(
                    account_id = account.id,
                    report_type = %record_type,
                    report_date,
                    "Initiating report generation"
                );
                let url = self.client.endpoint(&init_endpoint(*record_type));
                let response = self.client.post_json(&url, account.id, &body).await?;

                if response.status() != StatusCode::ACCEPTED {
                    let status = response.status();
                    let detail = response.text().await.unwrap_or_default();
                    warn!(
                        account_id = account.id,
                        report_type = %record_type,
                        %status,
                        detail,
                        "Report submission rejected, skipping this pair for the date"
                    );
                    continue;
                }

                let init: ReportInitResponse = response.json().await.map_err(|e| {
                    ReportError::Decode(format!("invalid submit response: {e}"))
                })?;
                debug!(report_id = %init.report_id, "Report generation accepted");
                jobs.push(ReportJob::new(
                    init.report_id,
                    account.id,
                    *record_type,
                    report_date,
                ));
            }
        }

        info!(
            report_date,
            initiated = jobs.len(),
            "Report initiation finished for date"
        );
        Ok(jobs)
    }
}
