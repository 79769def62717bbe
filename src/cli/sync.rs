//! Sync and plan command implementations.

use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

use crate::api::{AdsApiClient, RetryPolicy};
use crate::auth::{Authenticator, StaticTokenAuthenticator};
use crate::cli::CliError;
use crate::config::SyncConfig;
use crate::output::{JsonlRecordWriter, RecordSink};
use crate::report::{ReportInitiator, ReportPoller};
use crate::shutdown::SharedShutdown;
use crate::slices::plan_slices;
use crate::state::SyncState;

/// Arguments for the `sync` command
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Path to the connector configuration JSON file
    #[arg(long)]
    pub config: PathBuf,

    /// Path to the cursor state file
    #[arg(long)]
    pub state: PathBuf,

    /// Path to the JSON Lines output file
    #[arg(long)]
    pub output: PathBuf,

    /// Override the sleep between polling rounds, in seconds
    #[arg(long)]
    pub check_interval_secs: Option<u64>,

    /// Override the per-date wait deadline, in seconds
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,
}

impl SyncArgs {
    /// Run the incremental sync.
    pub async fn execute(&self, max_attempts: u32, shutdown: SharedShutdown) -> Result<(), CliError> {
        let config = SyncConfig::load(&self.config)?;
        config.validate()?;

        let authenticator: Arc<dyn Authenticator> =
            Arc::new(StaticTokenAuthenticator::new(config.access_token.clone()));
        let retry = RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        };
        let client = Arc::new(
            AdsApiClient::new(
                reqwest::Client::new(),
                config.base_url.clone(),
                config.client_id.clone(),
                authenticator,
            )
            .with_retry_policy(retry)
            .with_shutdown(shutdown.clone()),
        );

        let state = SyncState::load_optional(&self.state)?;
        let slices = plan_slices(state.as_ref().map(|s| s.report_date.as_str()))?;
        if slices.is_empty() {
            info!("Cursor is ahead of the current date, nothing to sync");
            return Ok(());
        }
        info!(slices = slices.len(), first = %slices[0], "Planned report date slices");

        let initiator = ReportInitiator::new(
            client.clone(),
            config.accounts.clone(),
            config.metrics.clone(),
        );
        let mut poller = ReportPoller::new(client).with_shutdown(shutdown.clone());
        if let Some(secs) = self.check_interval_secs {
            poller = poller.with_check_interval(Duration::from_secs(secs));
        }
        if let Some(secs) = self.wait_timeout_secs {
            poller = poller.with_wait_timeout(Duration::from_secs(secs));
        }

        // Append so records written by earlier runs survive; the cursor
        // only claims a date is synced if its records are still on disk.
        let mut sink = JsonlRecordWriter::append(&self.output)?;

        for report_date in &slices {
            if shutdown.is_shutdown_requested() {
                warn!("Shutdown requested, stopping before next slice");
                break;
            }

            let span = tracing::info_span!("sync_slice", report_date = %report_date);
            async {
                let jobs = initiator.initiate(report_date).await?;
                let outcome = poller.poll(jobs, &mut sink).await?;
                info!(
                    initiated = outcome.initiated,
                    completed = outcome.completed,
                    failed = outcome.failed,
                    abandoned = outcome.abandoned,
                    records = outcome.records_emitted,
                    "Slice finished"
                );
                sink.flush()?;

                // The cursor advances even when some jobs timed out; the
                // next run starts from this date rather than repeating
                // older ones.
                SyncState::new(report_date.clone()).save(&self.state)?;
                Ok::<(), CliError>(())
            }
            .instrument(span)
            .await?;
        }

        info!(records = sink.records_written(), "Sync finished");
        sink.close()?;
        Ok(())
    }
}

/// Arguments for the `plan` command
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Path to the cursor state file
    #[arg(long)]
    pub state: PathBuf,
}

impl PlanArgs {
    /// Print the slices a sync would process, one per line.
    pub async fn execute(&self) -> Result<(), CliError> {
        let state = SyncState::load_optional(&self.state)?;
        let slices = plan_slices(state.as_ref().map(|s| s.report_date.as_str()))?;
        if slices.is_empty() {
            println!("nothing to sync: cursor is ahead of the current date");
            return Ok(());
        }
        for slice in slices {
            println!("{slice}");
        }
        Ok(())
    }
}
