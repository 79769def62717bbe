//! Report workflow configuration constants and endpoints.

use std::time::Duration;

use crate::RecordType;

/// Campaign-targeting tactic requested for every report.
/// The API requires one; only the most common tactic is supported here.
pub const TACTIC: &str = "T00020";

/// Sleep between polling rounds. Report generation typically takes
/// minutes.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Wall-clock deadline for one report date's jobs. Jobs still pending
/// after this are abandoned; records already emitted are kept.
pub const REPORT_WAIT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Bound on concurrent status checks within one polling round.
pub const STATUS_CHECK_CONCURRENCY: usize = 8;

/// Endpoint initiating generation of a report of the given type.
pub fn init_endpoint(record_type: RecordType) -> String {
    format!("/sd/{}/report", record_type.as_str())
}

/// Endpoint reporting the generation status of a submitted report.
pub fn status_endpoint(report_id: &str) -> String {
    format!("/v2/reports/{report_id}")
}
