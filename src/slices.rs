//! Date-cursor slice planning.
//!
//! Incremental sync walks forward one calendar day at a time. The stored
//! cursor date itself is re-processed (reports for a recent date keep
//! changing as attribution settles), then every day through the current
//! date inclusive.

use chrono::{NaiveDate, Utc};

use crate::state::StateError;

/// Wire format for report dates: 8-digit year-month-day.
pub const REPORT_DATE_FORMAT: &str = "%Y%m%d";

/// Parse a report date in `YYYYMMDD` format.
pub fn parse_report_date(value: &str) -> Result<NaiveDate, StateError> {
    NaiveDate::parse_from_str(value, REPORT_DATE_FORMAT).map_err(|e| StateError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Format a date in the `YYYYMMDD` wire format.
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

/// Plan the report date slices to process given the stored cursor.
///
/// With no cursor the current date is the only slice. A cursor after the
/// current date yields no slices.
pub fn plan_slices(cursor: Option<&str>) -> Result<Vec<String>, StateError> {
    let start = cursor.map(parse_report_date).transpose()?;
    Ok(date_range(start, Utc::now().date_naive()))
}

/// Inclusive walk from `start` (or `today` when absent) through `today`.
pub fn date_range(start: Option<NaiveDate>, today: NaiveDate) -> Vec<String> {
    let start = start.unwrap_or(today);
    let mut slices = Vec::new();
    let mut day = start;
    while day <= today {
        slices.push(format_report_date(day));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    slices
}
