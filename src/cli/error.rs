//! CLI error types and conversions

use crate::api::RequestError;
use crate::config::ConfigError;
use crate::output::OutputError;
use crate::report::ReportError;
use crate::state::StateError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request error
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Report workflow error
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// Cursor state error
    #[error("state error: {0}")]
    State(#[from] StateError),

    /// Output error
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
