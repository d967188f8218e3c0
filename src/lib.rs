//! Differential Backup Library
//!
//! This library mirrors a directory tree from a network share onto a locally
//! attached volume. A run is split into a planning pass that decides which
//! files changed since the last backup and an execution pass that copies them
//! one at a time, reporting progress and honoring cooperative cancellation.

pub mod cli;
pub mod io;
pub mod models;
pub mod services;
pub mod source;

pub use models::{
    CopyAction, HistoryEntry, Plan, Progress, RemoteEntry, RunEvent, RunOutcome, RunState,
};
pub use services::execute::{CancelToken, ExecutionResult};
pub use services::history::HistoryLog;
pub use services::orchestrator::{EventNotifier, Orchestrator, RunHandle};
pub use source::RemoteFileSource;

use std::path::PathBuf;
use std::result;

/// Custom error type for the library
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    /// A remote directory could not be listed.
    Listing { address: String, message: String },
    /// A remote file could not be opened for reading.
    Open { address: String, message: String },
    /// Copying a single file failed; the run stops here.
    Copy { path: PathBuf, cause: String },
    /// A remote entry whose name cannot be used as a local path component.
    UnusableName { address: String, name: String },
    InsufficientSpace { needed: u64, available: u64 },
    AlreadyRunning,
    Serialization(String),
    /// The background run panicked.
    Panicked(String),
    InterruptHandler(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use services::format::format_size;

        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::Listing { address, message } => {
                write!(f, "Failed to list remote files in {address}: {message}")
            }
            Error::Open { address, message } => {
                write!(f, "Failed to open remote file {address}: {message}")
            }
            Error::Copy { path, cause } => {
                write!(f, "Failed to copy {}: {cause}", path.display())
            }
            Error::UnusableName { address, name } => {
                write!(f, "Cannot back up {address}: unusable file name {name:?}")
            }
            Error::InsufficientSpace { needed, available } => write!(
                f,
                "Insufficient disk space. Need {}, available {}",
                format_size(*needed),
                format_size(*available)
            ),
            Error::AlreadyRunning => write!(f, "Backup already in progress"),
            Error::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            Error::Panicked(msg) => write!(f, "Backup worker panicked: {msg}"),
            Error::InterruptHandler(msg) => {
                write!(f, "Failed to install interrupt handler: {msg}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;
