//! Unit tests for the configuration file

use chrono::{TimeZone, Utc};
use nasbak::io::config::{
    Configuration, load_configuration, save_configuration, set_aside_configuration,
};
use nasbak::{Error, HistoryEntry, RunOutcome};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn sample_entry() -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
        source_path: "/mnt/nas".to_string(),
        destination_path: "/media/usb".to_string(),
        files_copied: 3,
        total_bytes: 15,
        successful: true,
        error_message: None,
        outcome: RunOutcome::Completed,
    }
}

#[test]
fn test_missing_file_loads_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_configuration(&temp_dir.path().join("absent.json")).unwrap();
    assert_eq!(config, Configuration::default());
}

#[test]
fn test_corrupt_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("backup-config.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        load_configuration(&path),
        Err(Error::Serialization(_))
    ));
    // Nothing was rewritten.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn test_set_aside_keeps_corrupt_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("backup-config.json");
    fs::write(&path, "{ not json").unwrap();

    let aside = set_aside_configuration(&path).unwrap();

    assert!(!path.exists());
    assert_eq!(aside.parent(), Some(temp_dir.path()));
    assert!(
        aside
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("backup-config.json.corrupt-")
    );
    assert_eq!(fs::read_to_string(&aside).unwrap(), "{ not json");

    // A fresh run now starts from defaults without touching the old file.
    assert_eq!(load_configuration(&path).unwrap(), Configuration::default());
}

#[test]
fn test_entry_without_outcome_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("backup-config.json");
    fs::write(
        &path,
        r#"{
            "histories": [
                {
                    "timestamp": "2023-01-02T03:04:05Z",
                    "source_path": "/mnt/nas",
                    "destination_path": "/media/usb",
                    "files_copied": 7,
                    "total_bytes": 700,
                    "successful": true
                },
                {
                    "timestamp": "2023-01-03T03:04:05Z",
                    "source_path": "/mnt/nas",
                    "destination_path": "/media/usb",
                    "files_copied": 0,
                    "total_bytes": 0,
                    "successful": false,
                    "error_message": "Insufficient disk space"
                }
            ]
        }"#,
    )
    .unwrap();

    let mut config = load_configuration(&path).unwrap();
    assert_eq!(config.histories.len(), 2);
    assert_eq!(config.histories[0].outcome, RunOutcome::Completed);
    assert_eq!(config.histories[0].files_copied, 7);
    assert_eq!(config.histories[1].outcome, RunOutcome::Failed);

    // Saving back appends to, never replaces, the older entries.
    config.histories.push(sample_entry());
    save_configuration(&path, &config).unwrap();
    let reloaded = load_configuration(&path).unwrap();
    assert_eq!(reloaded.histories.len(), 3);
    assert_eq!(reloaded.histories[0].total_bytes, 700);
}

#[test]
fn test_save_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("backup-config.json");

    let config = Configuration {
        source_root: Some("/mnt/nas".to_string()),
        last_destination: Some(PathBuf::from("/media/usb")),
        histories: vec![sample_entry()],
    };
    save_configuration(&path, &config).unwrap();

    assert_eq!(load_configuration(&path).unwrap(), config);
}

#[test]
fn test_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("backup-config.json");
    fs::write(&path, r#"{"source_root": "/mnt/share"}"#).unwrap();

    let config = load_configuration(&path).unwrap();
    assert_eq!(config.source_root.as_deref(), Some("/mnt/share"));
    assert!(config.last_destination.is_none());
    assert!(config.histories.is_empty());
}

#[test]
fn test_history_error_message_omitted_when_absent() {
    let json = serde_json::to_string(&sample_entry()).unwrap();
    assert!(!json.contains("error_message"));
    assert!(json.contains(r#""outcome":"completed""#));
}
