//! Record output sinks.
//!
//! Records are pushed into a sink as they are discovered so large report
//! batches never accumulate in memory.

use crate::MetricRecord;

pub mod jsonl;

pub use jsonl::JsonlRecordWriter;

/// Output sink errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Record could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Buffer flush error
    #[error("flush error: {0}")]
    Flush(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for emitted metric records.
pub trait RecordSink {
    /// Write a single record to the sink.
    fn write_record(&mut self, record: &MetricRecord) -> OutputResult<()>;

    /// Flush any buffered records.
    fn flush(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// In-memory sink, mainly for tests and dry runs.
impl RecordSink for Vec<MetricRecord> {
    fn write_record(&mut self, record: &MetricRecord) -> OutputResult<()> {
        self.push(record.clone());
        Ok(())
    }
}
