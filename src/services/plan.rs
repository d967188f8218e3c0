//! Planning pass: walk the remote tree and the destination tree in lock-step
//! and decide which files need copying.
//!
//! Invariants:
//!
//! - Actions are emitted in pre-order discovery order (a directory's files in
//!   listing order, each subdirectory recursed when it is reached).
//! - Every destination directory missing at planning time counts as one unit
//!   in `total_files`, even though no bytes are moved for it.
//! - Local probe failures never cause a file to be skipped.
//! - A remote name that cannot be mapped onto the destination fails the plan
//!   rather than dropping the file.

use crate::models::{CopyAction, Plan, RemoteEntry};
use crate::source::{RemoteFileSource, epoch_millis};
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Compute the plan for mirroring `source_root` into `destination_root`.
///
/// Fails with [`crate::Error::Listing`] as soon as any remote directory cannot
/// be listed.
pub fn plan(
    source: &dyn RemoteFileSource,
    source_root: &str,
    destination_root: &Path,
) -> Result<Plan> {
    let mut plan = Plan::default();
    plan_directory(source, source_root, destination_root, &mut plan)?;

    log::info!(
        "Backup analysis: {} files to backup, {} bytes total",
        plan.total_files,
        plan.total_bytes
    );

    Ok(plan)
}

fn plan_directory(
    source: &dyn RemoteFileSource,
    source_dir: &str,
    destination_dir: &Path,
    plan: &mut Plan,
) -> Result<()> {
    let children = source.list_children(source_dir)?;
    log::debug!(
        "Planning {} entries from {source_dir} into {}",
        children.len(),
        destination_dir.display()
    );

    for entry in children {
        if !is_safe_name(&entry.name) {
            return Err(Error::UnusableName {
                address: entry.full_path,
                name: entry.name,
            });
        }

        let destination = destination_dir.join(&entry.name);

        if entry.is_directory {
            if !destination.exists() {
                plan.total_files += 1;
                plan.directories.push(destination.clone());
            }
            plan_directory(source, &entry.full_path, &destination, plan)?;
        } else if should_copy(&entry, &destination) {
            plan.total_files += 1;
            plan.total_bytes += entry.size;
            plan.actions.push(CopyAction {
                source_path: entry.full_path,
                destination_path: destination,
                expected_size: entry.size,
                source_modified_ms: entry.modified_at_epoch_millis,
            });
        }
    }

    Ok(())
}

/// Names that would escape or alias the destination directory are rejected.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !has_windows_separator(name)
}

#[cfg(windows)]
fn has_windows_separator(name: &str) -> bool {
    name.contains('\\') || name.contains(':')
}

/// A backslash is an ordinary file name character outside Windows.
#[cfg(not(windows))]
fn has_windows_separator(_name: &str) -> bool {
    false
}

/// Decide whether `entry` must be copied over `destination_path`.
///
/// Copies when the destination is missing, is not a regular file, differs in
/// size, or is older than the source. Any error while probing the destination
/// means "copy".
#[must_use]
pub fn should_copy(entry: &RemoteEntry, destination_path: &Path) -> bool {
    let metadata = match fs::metadata(destination_path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
        Err(e) => {
            log::warn!(
                "Could not check destination file {}: {e}",
                destination_path.display()
            );
            return true;
        }
    };

    if !metadata.is_file() {
        log::warn!(
            "Destination {} exists but is not a regular file",
            destination_path.display()
        );
        return true;
    }

    let local_modified = match metadata.modified() {
        Ok(time) => epoch_millis(time),
        Err(e) => {
            log::warn!(
                "Could not read modification time of {}: {e}",
                destination_path.display()
            );
            return true;
        }
    };

    entry.size != metadata.len() || entry.modified_at_epoch_millis > local_modified
}
