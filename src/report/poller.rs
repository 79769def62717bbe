//! Round-based report status polling.
//!
//! Drives a batch of pending report jobs to resolution:
//!
//! 1. Fan out status checks over all pending jobs (bounded concurrency),
//!    joining before any state is mutated.
//! 2. Download, decode, and emit every report that resolved this round,
//!    then drop it from the pending set.
//! 3. Sleep a fixed interval and repeat while jobs remain pending and the
//!    wall-clock deadline has not passed.
//!
//! Jobs still pending at the deadline are abandoned without failing the
//! slice; records already emitted are kept.

use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::api::AdsApiClient;
use crate::output::RecordSink;
use crate::report::config::{
    status_endpoint, CHECK_INTERVAL, REPORT_WAIT_TIMEOUT, STATUS_CHECK_CONCURRENCY,
};
use crate::report::download::download_report;
use crate::report::emit::emit_records;
use crate::report::job::{JobStatus, ReportJob, ReportStatusResponse};
use crate::report::{ReportError, ReportResult};
use crate::shutdown::{cancellable_sleep, SharedShutdown};

/// Summary of one date slice's polling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceOutcome {
    /// Jobs the poller started with
    pub initiated: usize,
    /// Jobs downloaded and emitted successfully
    pub completed: usize,
    /// Jobs that resolved as failed or whose body could not be decoded
    pub failed: usize,
    /// Jobs abandoned at the wait deadline or on shutdown
    pub abandoned: usize,
    /// Records pushed into the sink
    pub records_emitted: u64,
}

/// Polls pending report jobs until they resolve or time out.
pub struct ReportPoller {
    client: Arc<AdsApiClient>,
    check_interval: Duration,
    wait_timeout: Duration,
    concurrency: usize,
    shutdown: Option<SharedShutdown>,
}

impl ReportPoller {
    /// Create a poller with the default interval, deadline, and fan-out.
    pub fn new(client: Arc<AdsApiClient>) -> Self {
        Self {
            client,
            check_interval: CHECK_INTERVAL,
            wait_timeout: REPORT_WAIT_TIMEOUT,
            concurrency: STATUS_CHECK_CONCURRENCY,
            shutdown: None,
        }
    }

    /// Override the sleep between polling rounds.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Override the wall-clock deadline for the whole batch.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Override the status-check fan-out bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Attach a shared shutdown handle for graceful cancellation.
    pub fn with_shutdown(mut self, shutdown: SharedShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Poll the batch until every job resolves, the deadline passes, or
    /// shutdown is requested. Emits records for each completed job as it
    /// is discovered.
    pub async fn poll(
        &self,
        jobs: Vec<ReportJob>,
        sink: &mut dyn RecordSink,
    ) -> ReportResult<SliceOutcome> {
        let mut outcome = SliceOutcome {
            initiated: jobs.len(),
            ..Default::default()
        };
        let mut pending = jobs;
        let started = Instant::now();

        info!(count = pending.len(), "Waiting for reports to be generated");
        while !pending.is_empty() && started.elapsed() < self.wait_timeout {
            if self.shutdown_requested() {
                break;
            }

            info!(remaining = pending.len(), "Checking report status");
            let checks: Vec<ReportResult<(usize, JobStatus)>> =
                stream::iter(pending.iter().enumerate())
                    .map(|(idx, job)| async move {
                        self.check_status(job).await.map(|status| (idx, status))
                    })
                    .buffer_unordered(self.concurrency)
                    .collect()
                    .await;

            let mut resolved: Vec<usize> = Vec::new();
            let mut succeeded: Vec<(usize, String)> = Vec::new();
            for check in checks {
                let (idx, status) = check?;
                match status {
                    JobStatus::Succeeded(location) => succeeded.push((idx, location)),
                    JobStatus::Failed => {
                        let job = &pending[idx];
                        warn!(
                            report_id = %job.report_id,
                            account_id = job.account_id,
                            report_type = %job.report_type,
                            "Report generation failed server-side, dropping job"
                        );
                        outcome.failed += 1;
                        resolved.push(idx);
                    }
                    JobStatus::Pending => {}
                }
            }

            for (idx, location) in succeeded {
                let job = &pending[idx];
                match self.fetch_and_emit(job, &location, sink).await {
                    Ok(count) => {
                        outcome.completed += 1;
                        outcome.records_emitted += count;
                    }
                    Err(e) => {
                        // One bad report body must not lose the records
                        // already collected from sibling jobs.
                        error!(
                            report_id = %job.report_id,
                            account_id = job.account_id,
                            error = %e,
                            "Failed to download or decode report, dropping job"
                        );
                        outcome.failed += 1;
                    }
                }
                resolved.push(idx);
            }

            resolved.sort_unstable();
            resolved.dedup();
            for idx in resolved.into_iter().rev() {
                pending.swap_remove(idx);
            }

            if !pending.is_empty() && started.elapsed() < self.wait_timeout {
                info!(
                    remaining = pending.len(),
                    interval_secs = self.check_interval.as_secs(),
                    "Reports still generating, sleeping before next check"
                );
                if !cancellable_sleep(self.check_interval, self.shutdown.as_ref()).await {
                    break;
                }
            }
        }

        if pending.is_empty() {
            info!(
                completed = outcome.completed,
                failed = outcome.failed,
                records = outcome.records_emitted,
                "All reports have been processed"
            );
        } else {
            outcome.abandoned = pending.len();
            if self.shutdown_requested() {
                warn!(
                    abandoned = outcome.abandoned,
                    "Shutdown requested with reports still pending"
                );
            } else {
                error!(
                    abandoned = outcome.abandoned,
                    "Not all reports were processed before the wait timeout"
                );
            }
        }

        Ok(outcome)
    }

    /// Check one job's generation status.
    ///
    /// A non-success HTTP response leaves the job pending for the next
    /// round rather than failing the slice.
    async fn check_status(&self, job: &ReportJob) -> ReportResult<JobStatus> {
        let url = self.client.endpoint(&status_endpoint(&job.report_id));
        let response = self.client.get(&url, job.account_id).await?;

        if !response.status().is_success() {
            warn!(
                report_id = %job.report_id,
                status = %response.status(),
                "Unexpected status-check response, keeping job pending"
            );
            return Ok(JobStatus::Pending);
        }

        let status: ReportStatusResponse = response
            .json()
            .await
            .map_err(|e| ReportError::Decode(format!("invalid status response: {e}")))?;
        Ok(status.job_status())
    }

    /// Download a finished report and push its records into the sink.
    async fn fetch_and_emit(
        &self,
        job: &ReportJob,
        location: &str,
        sink: &mut dyn RecordSink,
    ) -> ReportResult<u64> {
        let rows = download_report(&self.client, job, location).await?;
        let mut count = 0u64;
        for record in emit_records(job, rows) {
            sink.write_record(&record)?;
            count += 1;
        }
        debug!(
            report_id = %job.report_id,
            records = count,
            "Report downloaded and records emitted"
        );
        Ok(count)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|s| s.is_shutdown_requested())
            .unwrap_or(false)
    }
}
