//! Execution pass: perform a plan's copy actions one at a time.
//!
//! The source is usually a single network connection, so actions run strictly
//! sequentially. Cancellation is observed only between actions; a file that
//! has started copying is always finished.

use crate::models::{CopyAction, Plan, Progress};
use crate::source::RemoteFileSource;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cooperative cancellation flag shared between a run and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// How an execution pass ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Completed,
    Cancelled,
}

/// Run every action of `plan` against `source`, writing under
/// `destination_root`.
///
/// `on_file_start` fires before each transfer begins and `on_progress`
/// receives a copy of the counters after each completed action. The first
/// failure stops the pass with [`Error::Copy`]; files copied before it stay
/// on disk.
pub fn execute(
    plan: &Plan,
    source: &dyn RemoteFileSource,
    destination_root: &Path,
    progress: &mut Progress,
    on_file_start: &mut dyn FnMut(&CopyAction),
    on_progress: &mut dyn FnMut(&Progress),
    cancel: &CancelToken,
) -> Result<ExecutionResult> {
    let mut pending_dirs: HashSet<&Path> =
        plan.directories.iter().map(|dir| dir.as_path()).collect();

    fs::create_dir_all(destination_root).map_err(|e| copy_error(destination_root, &e))?;

    for action in &plan.actions {
        if cancel.is_cancelled() {
            log::info!(
                "Backup cancelled after {} of {} units",
                progress.files_processed,
                progress.total_files
            );
            return Ok(ExecutionResult::Cancelled);
        }

        if let Some(parent) = action.destination_path.parent() {
            fs::create_dir_all(parent).map_err(|e| copy_error(parent, &e))?;
            for ancestor in parent.ancestors() {
                if pending_dirs.remove(ancestor) {
                    progress.record_directory();
                }
                if ancestor == destination_root {
                    break;
                }
            }
        }

        on_file_start(action);
        copy_file(source, action)?;

        progress.record_file(action.expected_size);
        on_progress(progress);
    }

    // Every action is done; only outstanding empty directories can still be
    // cut short.
    if cancel.is_cancelled() && !pending_dirs.is_empty() {
        return Ok(ExecutionResult::Cancelled);
    }

    // Directories with nothing to copy below them are still mirrored.
    let mut credited = false;
    for dir in &plan.directories {
        if pending_dirs.remove(dir.as_path()) {
            fs::create_dir_all(dir).map_err(|e| copy_error(dir, &e))?;
            progress.record_directory();
            credited = true;
        }
    }
    if credited {
        on_progress(progress);
    }

    Ok(ExecutionResult::Completed)
}

fn copy_error(path: &Path, err: &dyn std::fmt::Display) -> Error {
    Error::Copy {
        path: path.to_path_buf(),
        cause: err.to_string(),
    }
}

/// Stream one remote file over the destination, replacing it in full.
fn copy_file(source: &dyn RemoteFileSource, action: &CopyAction) -> Result<()> {
    let destination = action.destination_path.as_path();

    let mut reader = source
        .open_for_read(&action.source_path)
        .map_err(|e| copy_error(destination, &e))?;

    let mut file = fs::File::create(destination).map_err(|e| copy_error(destination, &e))?;
    let copied = io::copy(&mut reader, &mut file).map_err(|e| copy_error(destination, &e))?;

    if copied != action.expected_size {
        log::warn!(
            "Copied {copied} bytes for {} but the listing reported {}",
            action.source_path,
            action.expected_size
        );
    }

    if let Some(modified) = system_time_from_millis(action.source_modified_ms) {
        if let Err(e) = file.set_modified(modified) {
            log::warn!(
                "Could not set modification time on {}: {e}",
                destination.display()
            );
        }
    }

    log::debug!("Copied {} -> {}", action.source_path, destination.display());
    Ok(())
}

fn system_time_from_millis(ms: i64) -> Option<SystemTime> {
    let offset = Duration::from_millis(ms.unsigned_abs());
    if ms >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}
