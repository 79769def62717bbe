//! Report generation workflow.
//!
//! The reporting API computes metrics reports asynchronously. The workflow
//! for one report date is:
//!
//! 1. **Initiation**: [`initiator::ReportInitiator`] submits one
//!    generation request per eligible (account, report-type) pair.
//! 2. **Polling**: [`poller::ReportPoller`] checks the pending jobs each
//!    round until they resolve or the wait deadline passes.
//! 3. **Download**: [`download`] fetches and decompresses a finished
//!    report body.
//! 4. **Emission**: [`emit`] tags each decoded row with its job metadata
//!    and pushes it into the caller's record sink.

use crate::api::RequestError;
use crate::output::OutputError;

pub mod config;
pub mod download;
pub mod emit;
pub mod initiator;
pub mod job;
pub mod poller;

pub use initiator::ReportInitiator;
pub use job::{JobStatus, ReportJob};
pub use poller::{ReportPoller, SliceOutcome};

/// Report workflow errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// HTTP request failed after retries
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Report body could not be fetched
    #[error("download error: {0}")]
    Download(String),

    /// Report body could not be decompressed or parsed
    #[error("decode error: {0}")]
    Decode(String),

    /// Record sink rejected a record
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;
