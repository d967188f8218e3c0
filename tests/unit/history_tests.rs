//! Unit tests for history records

use nasbak::services::history::{build_entry, record_run};
use nasbak::{HistoryLog, Progress, RunOutcome};

fn processed(files: u64, bytes: u64) -> Progress {
    Progress {
        total_files: 3,
        total_bytes: 15,
        files_processed: files,
        bytes_processed: bytes,
    }
}

#[test]
fn test_completed_entry() {
    let entry = build_entry(
        "/mnt/nas",
        "/media/usb",
        Some(&processed(3, 15)),
        RunOutcome::Completed,
        None,
    );
    assert!(entry.successful);
    assert_eq!(entry.files_copied, 3);
    assert_eq!(entry.total_bytes, 15);
    assert!(entry.error_message.is_none());
}

#[test]
fn test_failed_entry_keeps_message() {
    let entry = build_entry(
        "/mnt/nas",
        "/media/usb",
        None,
        RunOutcome::Failed,
        Some("Insufficient disk space".to_string()),
    );
    assert!(!entry.successful);
    assert_eq!(entry.files_copied, 0);
    assert_eq!(entry.error_message.as_deref(), Some("Insufficient disk space"));
}

#[test]
fn test_cancelled_entry_has_no_message() {
    let entry = build_entry(
        "/mnt/nas",
        "/media/usb",
        Some(&processed(1, 4)),
        RunOutcome::Cancelled,
        Some("ignored".to_string()),
    );
    assert!(!entry.successful);
    assert_eq!(entry.outcome, RunOutcome::Cancelled);
    assert_eq!((entry.files_copied, entry.total_bytes), (1, 4));
    assert!(entry.error_message.is_none());
}

#[test]
fn test_log_appends_in_order() {
    let history = HistoryLog::new();
    assert!(history.is_empty());

    record_run(&history, "/first", "/dst", None, RunOutcome::Failed, None);
    record_run(
        &history,
        "/second",
        "/dst",
        Some(&processed(3, 15)),
        RunOutcome::Completed,
        None,
    );

    let entries = history.entries();
    assert_eq!(history.len(), 2);
    assert_eq!(entries[0].source_path, "/first");
    assert_eq!(entries[1].source_path, "/second");
    assert!(entries[0].timestamp <= entries[1].timestamp);
    assert_eq!(history.last().unwrap().source_path, "/second");
}

#[test]
fn test_clones_share_entries() {
    let history = HistoryLog::new();
    let shared = history.clone();
    record_run(&shared, "/src", "/dst", None, RunOutcome::Cancelled, None);
    assert_eq!(history.len(), 1);
}
