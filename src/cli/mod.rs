//! CLI command implementations

use clap::{Parser, Subcommand};

pub mod error;
pub mod sync;

pub use error::CliError;
pub use sync::{PlanArgs, SyncArgs};

/// Incremental downloader for asynchronous advertising metrics reports
#[derive(Debug, Parser)]
#[command(name = "ads-report-downloader", version, about)]
pub struct Cli {
    /// Maximum attempts per HTTP request before a transient failure
    /// becomes fatal
    #[arg(long, global = true, default_value_t = crate::api::config::MAX_ATTEMPTS)]
    pub max_attempts: u32,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run an incremental sync from the stored cursor through today
    Sync(SyncArgs),
    /// Print the report date slices a sync would process
    Plan(PlanArgs),
}
