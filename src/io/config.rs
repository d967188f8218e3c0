//! JSON configuration file holding the last used paths and run history.
//!
//! The engine never reads or writes this file itself; callers load it, hand
//! its history to the [`crate::HistoryLog`], and save it back after a run.

use crate::Result;
use crate::models::HistoryEntry;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = ".nas-backup";
pub const CONFIG_FILE_NAME: &str = "backup-config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Mounted share or directory backed up by default.
    pub source_root: Option<String>,
    pub last_destination: Option<PathBuf>,
    pub histories: Vec<HistoryEntry>,
}

/// `~/.nas-backup/backup-config.json`, or the temp dir when the home
/// directory is unavailable or not writable.
#[must_use]
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME));

    let dir = match config_dir {
        Some(dir) => match fs::create_dir_all(&dir) {
            Ok(()) => dir,
            Err(e) => {
                log::warn!(
                    "Could not create config directory {}, using temp directory: {e}",
                    dir.display()
                );
                std::env::temp_dir()
            }
        },
        None => {
            log::warn!("Could not determine home directory, using temp directory");
            std::env::temp_dir()
        }
    };

    dir.join(CONFIG_FILE_NAME)
}

/// Load configuration; a missing file yields the defaults.
///
/// An unreadable or unparsable file is an error so the caller never saves
/// defaults over history it could not read.
pub fn load_configuration(path: &Path) -> Result<Configuration> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Using default configuration");
            return Ok(Configuration::default());
        }
        Err(e) => return Err(e.into()),
    };

    let config = serde_json::from_str(&text)?;
    log::info!("Configuration loaded from: {}", path.display());
    Ok(config)
}

/// Rename an unusable configuration file next to itself
/// (`backup-config.json.corrupt-<unix seconds>`) and return the new path.
pub fn set_aside_configuration(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| CONFIG_FILE_NAME.into());
    name.push(format!(".corrupt-{}", Utc::now().timestamp()));

    let aside = path.with_file_name(name);
    fs::rename(path, &aside)?;
    log::warn!(
        "Moved unreadable configuration {} to {}",
        path.display(),
        aside.display()
    );
    Ok(aside)
}

/// Write configuration as pretty JSON, creating parent directories.
pub fn save_configuration(path: &Path, config: &Configuration) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    log::info!("Configuration saved to: {}", path.display());
    Ok(())
}
