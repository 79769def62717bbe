//! Report download and decoding.
//!
//! A finished report is served from an absolute download URL as a
//! gzip-compressed UTF-8 JSON array, one object per metric row.

use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;
use tracing::debug;

use crate::api::AdsApiClient;
use crate::report::job::ReportJob;
use crate::report::{ReportError, ReportResult};

/// Fetch and decode a generated report body.
pub async fn download_report(
    client: &AdsApiClient,
    job: &ReportJob,
    location: &str,
) -> ReportResult<Vec<Value>> {
    debug!(report_id = %job.report_id, location, "Downloading report");
    let response = client.get(location, job.account_id).await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ReportError::Download(format!(
            "unexpected HTTP status {status} from download URL"
        )));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ReportError::Download(format!("failed to read report body: {e}")))?;
    decode_report(&body)
}

/// Decompress and parse a report body into its metric rows.
pub fn decode_report(body: &[u8]) -> ReportResult<Vec<Value>> {
    let mut decoder = GzDecoder::new(body);
    let mut raw = String::new();
    decoder
        .read_to_string(&mut raw)
        .map_err(|e| ReportError::Decode(format!("gzip decompression failed: {e}")))?;

    serde_json::from_str(&raw)
        .map_err(|e| ReportError::Decode(format!("report is not a JSON array of rows: {e}")))
}
