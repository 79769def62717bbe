//! JSON Lines record writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::output::{OutputError, OutputResult, RecordSink};
use crate::MetricRecord;

/// Writes one JSON document per line to a file.
pub struct JsonlRecordWriter {
    writer: BufWriter<File>,
    records_written: u64,
}

impl JsonlRecordWriter {
    /// Create a writer, creating parent directories as needed and
    /// truncating any existing file.
    pub fn new(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::Io(e.to_string()))?;
        }
        let file = File::create(path).map_err(|e| OutputError::Io(e.to_string()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Open a writer that appends to an existing file, creating it and
    /// any parent directories as needed.
    ///
    /// Incremental runs use this: records from earlier runs stay in
    /// place, matching what the saved cursor claims has been synced.
    pub fn append(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::Io(e.to_string()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::Io(e.to_string()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flush buffers and finalize the output file.
    pub fn close(mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::Flush(e.to_string()))
    }
}

impl RecordSink for JsonlRecordWriter {
    fn write_record(&mut self, record: &MetricRecord) -> OutputResult<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| OutputError::Serialization(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| OutputError::Io(e.to_string()))?;
        self.records_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::Flush(e.to_string()))
    }
}
