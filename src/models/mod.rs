//! Data models for remote entries, backup plans, progress, and run history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Snapshot of one remote filesystem node at listing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub full_path: String,
    pub is_directory: bool,
    pub size: u64,
    pub modified_at_epoch_millis: i64,
}

/// One file that must be copied during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyAction {
    pub source_path: String,
    pub destination_path: PathBuf,
    pub expected_size: u64,
    pub source_modified_ms: i64,
}

/// Precomputed work for one run.
///
/// `actions` and `directories` are kept in pre-order discovery order.
/// `directories` lists destination directories that were missing at planning
/// time; each one counts as a single unit in `total_files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub total_files: u64,
    pub total_bytes: u64,
    pub actions: Vec<CopyAction>,
    pub directories: Vec<PathBuf>,
}

impl Plan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }
}

/// Counters tracking a run's advancement toward its planned totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total_files: u64,
    pub total_bytes: u64,
    pub files_processed: u64,
    pub bytes_processed: u64,
}

impl Progress {
    /// Fresh counters seeded from a plan's totals.
    #[must_use]
    pub fn for_plan(plan: &Plan) -> Self {
        Self {
            total_files: plan.total_files,
            total_bytes: plan.total_bytes,
            files_processed: 0,
            bytes_processed: 0,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn file_fraction(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.files_processed as f64 / self.total_files as f64
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn byte_fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            self.bytes_processed as f64 / self.total_bytes as f64
        }
    }

    pub(crate) fn record_file(&mut self, size: u64) {
        self.files_processed = self.files_processed.saturating_add(1);
        self.bytes_processed = self.bytes_processed.saturating_add(size);
    }

    pub(crate) fn record_directory(&mut self) {
        self.files_processed = self.files_processed.saturating_add(1);
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Failed,
    Cancelled,
}

impl RunOutcome {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Failed => "failed",
            RunOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredHistoryEntry")]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub source_path: String,
    pub destination_path: String,
    pub files_copied: u64,
    pub total_bytes: u64,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub outcome: RunOutcome,
}

/// On-disk shape of a history entry; files written before `outcome` existed
/// only carry `successful`.
#[derive(Deserialize)]
struct StoredHistoryEntry {
    timestamp: DateTime<Utc>,
    source_path: String,
    destination_path: String,
    files_copied: u64,
    total_bytes: u64,
    successful: bool,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    outcome: Option<RunOutcome>,
}

impl From<StoredHistoryEntry> for HistoryEntry {
    fn from(stored: StoredHistoryEntry) -> Self {
        let outcome = stored.outcome.unwrap_or(if stored.successful {
            RunOutcome::Completed
        } else {
            RunOutcome::Failed
        });
        Self {
            timestamp: stored.timestamp,
            source_path: stored.source_path,
            destination_path: stored.destination_path,
            files_copied: stored.files_copied,
            total_bytes: stored.total_bytes,
            successful: stored.successful,
            error_message: stored.error_message,
            outcome,
        }
    }
}

/// Lifecycle of the orchestrator's single run slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Planning,
    CopySpaceCheck,
    Copying,
    Completed,
    Failed,
    Cancelled,
}

impl RunState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Planning => "planning",
            RunState::CopySpaceCheck => "space-check",
            RunState::Copying => "copying",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
            RunState::Cancelled => "cancelled",
        }
    }

    /// True while a run occupies the slot, terminal states included.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, RunState::Idle)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification published from the background run to the caller.
///
/// Events for one run are delivered in order from a single thread; the last
/// event is always `Completed`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Status(String),
    Progress(Progress),
    Completed { success: bool },
}
