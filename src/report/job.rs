//! Report job handles and status tracking.

use serde::Deserialize;

use crate::RecordType;

/// Wire status string for a successfully generated report.
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Wire status string for a failed report generation.
pub const STATUS_FAILURE: &str = "FAILURE";

/// Handle for one pending server-side report computation.
///
/// Created when the API accepts a generation request; immutable afterward.
/// A job leaves the pending set once its status resolves or the slice's
/// wait deadline passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJob {
    /// Opaque report identifier returned by the submit call
    pub report_id: String,
    /// Account the report is scoped to
    pub account_id: u64,
    /// Report type being generated
    pub report_type: RecordType,
    /// Report date in `YYYYMMDD` format
    pub report_date: String,
}

impl ReportJob {
    /// Create a job handle from an accepted submit response.
    pub fn new(
        report_id: impl Into<String>,
        account_id: u64,
        report_type: RecordType,
        report_date: impl Into<String>,
    ) -> Self {
        Self {
            report_id: report_id.into(),
            account_id,
            report_type,
            report_date: report_date.into(),
        }
    }
}

/// Resolution state of a report job, derived fresh each polling round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Report is still being generated
    Pending,
    /// Report finished; payload is at the contained download URL
    Succeeded(String),
    /// Server gave up generating the report
    Failed,
}

/// Response body of a report submit call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInitResponse {
    /// Identifier of the queued report
    pub report_id: String,
    /// Initial generation status
    pub status: String,
}

/// Response body of a report status check.
#[derive(Debug, Deserialize)]
pub struct ReportStatusResponse {
    /// Generation status string
    pub status: String,
    /// Download URL, present once generation succeeds
    #[serde(default)]
    pub location: Option<String>,
}

impl ReportStatusResponse {
    /// Map the wire response onto a [`JobStatus`].
    ///
    /// Succeeded requires both a `SUCCESS` status and a non-empty
    /// location; a success without a location stays pending and is
    /// re-checked next round.
    pub fn job_status(self) -> JobStatus {
        match (self.status.as_str(), self.location) {
            (STATUS_SUCCESS, Some(location)) if !location.is_empty() => {
                JobStatus::Succeeded(location)
            }
            (STATUS_FAILURE, _) => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}
