//! Append-only run history.
//!
//! The log is owned by the caller (typically loaded from and saved back to the
//! configuration file); the engine only ever appends to it.

use crate::models::{HistoryEntry, Progress, RunOutcome};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, ordered sequence of history entries.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap entries loaded from persisted state.
    #[must_use]
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, entry: HistoryEntry) {
        self.lock().push(entry);
    }

    /// Copy of the current entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<HistoryEntry> {
        self.lock().last().cloned()
    }
}

/// Build the record for a finished run.
///
/// `progress` holds what the run actually processed; a run that failed before
/// copying anything passes `None`. Only a full, uncancelled run is marked
/// successful, and only a failure carries an error message.
#[must_use]
pub fn build_entry(
    source_path: &str,
    destination_path: &str,
    progress: Option<&Progress>,
    outcome: RunOutcome,
    error_message: Option<String>,
) -> HistoryEntry {
    let (files_copied, total_bytes) =
        progress.map_or((0, 0), |p| (p.files_processed, p.bytes_processed));

    HistoryEntry {
        timestamp: Utc::now(),
        source_path: source_path.to_string(),
        destination_path: destination_path.to_string(),
        files_copied,
        total_bytes,
        successful: outcome == RunOutcome::Completed,
        error_message: match outcome {
            RunOutcome::Failed => error_message,
            RunOutcome::Completed | RunOutcome::Cancelled => None,
        },
        outcome,
    }
}

/// Append the record for a finished run to `history`.
pub fn record_run(
    history: &HistoryLog,
    source_path: &str,
    destination_path: &str,
    progress: Option<&Progress>,
    outcome: RunOutcome,
    error_message: Option<String>,
) -> HistoryEntry {
    let entry = build_entry(
        source_path,
        destination_path,
        progress,
        outcome,
        error_message,
    );
    log::info!(
        "Recording {} backup of {source_path}: {} units, {} bytes",
        entry.outcome,
        entry.files_copied,
        entry.total_bytes
    );
    history.append(entry.clone());
    entry
}
