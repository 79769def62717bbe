//! Persisted sync cursor.
//!
//! The cursor is the high-water-mark report date: the last slice that was
//! processed, stored after each slice so an interrupted sync resumes from
//! that date. Writes are atomic (temp file + rename) and guarded by an
//! advisory file lock.

use fd_lock::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Cursor state errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(String),

    /// Advisory lock could not be taken
    #[error("lock error: {0}")]
    Lock(String),

    /// Cursor could not be serialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Cursor file contents were not valid
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Report date string did not match the wire format
    #[error("invalid report date '{value}': {reason}")]
    InvalidDate {
        /// The offending value
        value: String,
        /// Parser detail
        reason: String,
    },
}

/// Persisted cursor for the incremental sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Last processed report date in `YYYYMMDD` format
    #[serde(rename = "reportDate")]
    pub report_date: String,
}

impl SyncState {
    /// Create cursor state for a processed report date.
    pub fn new(report_date: impl Into<String>) -> Self {
        Self {
            report_date: report_date.into(),
        }
    }

    /// Load cursor state, returning `None` when no state file exists yet.
    pub fn load_optional(path: &Path) -> Result<Option<Self>, StateError> {
        if !path.exists() {
            debug!(path = %path.display(), "No cursor state found, starting fresh");
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Load cursor state from a file, taking a shared lock while reading.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let lock_file = open_lock_file(path)?;
        let lock = RwLock::new(lock_file);
        let _guard = lock
            .read()
            .map_err(|e| StateError::Lock(format!("failed to acquire read lock: {e}")))?;

        let contents = std::fs::read_to_string(path).map_err(|e| StateError::Io(e.to_string()))?;
        let state: SyncState = serde_json::from_str(&contents)
            .map_err(|e| StateError::Deserialization(e.to_string()))?;

        debug!(report_date = %state.report_date, "Cursor state loaded");
        Ok(state)
    }

    /// Save cursor state atomically, taking an exclusive lock while
    /// writing. The temp file is persisted with a rename so a crash never
    /// leaves a torn cursor behind.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StateError::Io(e.to_string()))?;
        }

        let json =
            serde_json::to_string_pretty(self).map_err(|e| StateError::Serialization(e.to_string()))?;

        let lock_file = open_lock_file(path)?;
        let mut lock = RwLock::new(lock_file);
        let _guard = lock
            .write()
            .map_err(|e| StateError::Lock(format!("failed to acquire write lock: {e}")))?;

        let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
            .map_err(|e| StateError::Io(format!("failed to create temp file: {e}")))?;
        temp_file
            .write_all(json.as_bytes())
            .map_err(|e| StateError::Io(format!("failed to write temp file: {e}")))?;
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| StateError::Io(format!("failed to sync temp file: {e}")))?;
        temp_file
            .persist(path)
            .map_err(|e| StateError::Io(format!("failed to persist cursor: {e}")))?;

        // Fsync the directory so the rename survives a crash
        if let Some(parent) = path.parent() {
            if let Ok(dir) = std::fs::File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        info!(report_date = %self.report_date, path = %path.display(), "Cursor state saved");
        Ok(())
    }
}

fn open_lock_file(path: &Path) -> Result<std::fs::File, StateError> {
    let lock_path = path.with_extension("lock");
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| StateError::Lock(format!("failed to open lock file: {e}")))
}
