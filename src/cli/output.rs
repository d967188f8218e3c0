//! Output formatting for CLI

use crate::models::{HistoryEntry, Plan, Progress, RunOutcome};
use crate::services::format::format_size;
use chrono::Local;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One-line progress summary, e.g. `Files: 2/3 (10 B/15 B)`
#[must_use]
pub fn format_progress(progress: &Progress) -> String {
    format!(
        "Files: {}/{} ({}/{}) {:.0}%",
        progress.files_processed,
        progress.total_files,
        format_size(progress.bytes_processed),
        format_size(progress.total_bytes),
        progress.file_fraction() * 100.0
    )
}

#[must_use]
pub fn format_plan_text(plan: &Plan) -> String {
    let mut out = format!(
        "{} units to back up ({} new directories, {} files), {} total\n",
        plan.total_files,
        plan.directories.len(),
        plan.actions.len(),
        format_size(plan.total_bytes)
    );
    for dir in &plan.directories {
        out.push_str(&format!("  mkdir {}\n", dir.display()));
    }
    for action in &plan.actions {
        out.push_str(&format!(
            "  copy  {} -> {} ({})\n",
            action.source_path,
            action.destination_path.display(),
            format_size(action.expected_size)
        ));
    }
    out
}

/// Plan as JSON; falls back to an empty object if serialization fails.
#[must_use]
pub fn format_plan_json(plan: &Plan) -> String {
    serde_json::to_string_pretty(plan).unwrap_or_else(|e| {
        log::error!("Failed to serialize plan: {e}");
        "{}".to_string()
    })
}

fn status_label(entry: &HistoryEntry) -> &'static str {
    match entry.outcome {
        RunOutcome::Completed => "Success",
        RunOutcome::Failed => "Failed",
        RunOutcome::Cancelled => "Cancelled",
    }
}

/// History as a table, newest first.
#[must_use]
pub fn format_history_text(entries: &[HistoryEntry], limit: Option<usize>) -> String {
    if entries.is_empty() {
        return "No backups recorded\n".to_string();
    }

    let mut out = format!(
        "{:<19}  {:<9}  {:>7}  {:>10}  {}\n",
        "TIMESTAMP", "STATUS", "FILES", "SIZE", "SOURCE -> DESTINATION"
    );

    let shown = limit.unwrap_or(entries.len());
    for entry in entries.iter().rev().take(shown) {
        out.push_str(&format!(
            "{:<19}  {:<9}  {:>7}  {:>10}  {} -> {}\n",
            entry
                .timestamp
                .with_timezone(&Local)
                .format(DATETIME_FORMAT),
            status_label(entry),
            entry.files_copied,
            format_size(entry.total_bytes),
            entry.source_path,
            entry.destination_path
        ));
        if let Some(message) = &entry.error_message {
            out.push_str(&format!("{:<19}  error: {message}\n", ""));
        }
    }
    out
}

/// History as a JSON array, newest first.
#[must_use]
pub fn format_history_json(entries: &[HistoryEntry], limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(entries.len());
    let newest_first: Vec<&HistoryEntry> = entries.iter().rev().take(shown).collect();
    serde_json::to_string_pretty(&newest_first).unwrap_or_else(|e| {
        log::error!("Failed to serialize history: {e}");
        "[]".to_string()
    })
}
