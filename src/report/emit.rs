//! Record emission.

use serde_json::Value;

use crate::report::job::ReportJob;
use crate::MetricRecord;

/// Wrap decoded report rows with their job's metadata.
///
/// Returns a lazy, one-shot sequence; the poller consumes it immediately
/// and pushes each record into the sink, so large reports never sit in
/// memory as tagged records.
pub fn emit_records<'a>(
    job: &'a ReportJob,
    rows: Vec<Value>,
) -> impl Iterator<Item = MetricRecord> + 'a {
    rows.into_iter().map(move |metric| MetricRecord {
        account_id: job.account_id,
        report_type: job.report_type,
        report_date: job.report_date.clone(),
        metric,
    })
}
