//! Unit tests for the change-detection rule

use nasbak::RemoteEntry;
use nasbak::services::plan::should_copy;
use nasbak::source::epoch_millis;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn entry(size: u64, modified_ms: i64) -> RemoteEntry {
    RemoteEntry {
        name: "f.bin".to_string(),
        full_path: "/f.bin".to_string(),
        is_directory: false,
        size,
        modified_at_epoch_millis: modified_ms,
    }
}

fn local_mtime(path: &Path) -> i64 {
    epoch_millis(fs::metadata(path).unwrap().modified().unwrap())
}

#[test]
fn test_missing_destination_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    assert!(should_copy(&entry(1, 0), &temp_dir.path().join("f.bin")));
}

#[test]
fn test_size_difference_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.bin");
    fs::write(&path, b"abc").unwrap();

    // Even an older source wins when sizes differ.
    assert!(should_copy(&entry(4, 0), &path));
}

#[test]
fn test_newer_source_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.bin");
    fs::write(&path, b"abc").unwrap();

    assert!(should_copy(&entry(3, local_mtime(&path) + 1), &path));
}

#[test]
fn test_same_or_older_source_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.bin");
    fs::write(&path, b"abc").unwrap();
    let local = local_mtime(&path);

    assert!(!should_copy(&entry(3, local), &path));
    assert!(!should_copy(&entry(3, local - 60_000), &path));
}

#[test]
fn test_unreadable_destination_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, b"not a directory").unwrap();

    // Probing `blocker/f.bin` fails with "not a directory", not "not found".
    assert!(should_copy(&entry(3, 0), &blocker.join("f.bin")));
}

#[test]
fn test_directory_in_place_of_file_is_copied() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("f.bin");
    fs::create_dir(&path).unwrap();

    assert!(should_copy(&entry(0, 0), &path));
}
