//! Remote file sources consumed by the backup engine.
//!
//! The engine never talks to a network protocol directly. Everything it needs
//! from the share goes through [`RemoteFileSource`]: listing one directory and
//! opening one file for sequential reading. Connection handling and timeouts
//! belong to the implementation.

pub mod local;
pub mod memory;

pub use local::LocalDirSource;
pub use memory::MemorySource;

use crate::Result;
use crate::models::RemoteEntry;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory listing and file read access to the source tree.
pub trait RemoteFileSource: Send + Sync {
    /// List the immediate children of `address`.
    ///
    /// Fails with [`crate::Error::Listing`] on any I/O or protocol error.
    fn list_children(&self, address: &str) -> Result<Vec<RemoteEntry>>;

    /// Open the file at `address` for sequential reading.
    ///
    /// Fails with [`crate::Error::Open`].
    fn open_for_read(&self, address: &str) -> Result<Box<dyn Read + Send>>;
}

/// Milliseconds since the Unix epoch, negative for earlier timestamps.
#[must_use]
pub fn epoch_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis()).map_or(i64::MIN, |ms| -ms),
    }
}
