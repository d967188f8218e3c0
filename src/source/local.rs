//! Source backed by a share that is already mounted into the local filesystem
//! (CIFS/SMB or NFS mount, or any plain directory).

use super::{RemoteFileSource, epoch_millis};
use crate::models::RemoteEntry;
use crate::{Error, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalDirSource;

impl LocalDirSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn listing_error(address: &str, err: &std::io::Error) -> Error {
    Error::Listing {
        address: address.to_string(),
        message: err.to_string(),
    }
}

/// A link whose target cannot be resolved has no content to copy.
fn is_dangling_link(entry: &fs::DirEntry) -> bool {
    entry.file_type().is_ok_and(|t| t.is_symlink())
}

impl RemoteFileSource for LocalDirSource {
    fn list_children(&self, address: &str) -> Result<Vec<RemoteEntry>> {
        let dir = Path::new(address);
        let entries = fs::read_dir(dir).map_err(|e| listing_error(address, &e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| listing_error(address, &e))?;
            let entry_path = entry.path();

            // Follow symlinks the way a mounted share presents them.
            let metadata = match fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(e) if is_dangling_link(&entry) => {
                    log::warn!(
                        "Skipping broken symbolic link {}: {e}",
                        entry_path.display()
                    );
                    continue;
                }
                Err(e) => return Err(listing_error(&entry_path.to_string_lossy(), &e)),
            };

            let modified = metadata
                .modified()
                .map(epoch_millis)
                .map_err(|e| listing_error(&entry_path.to_string_lossy(), &e))?;

            children.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                full_path: entry_path.to_string_lossy().to_string(),
                is_directory: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                modified_at_epoch_millis: modified,
            });
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));

        log::debug!("Listed {} entries from: {address}", children.len());
        Ok(children)
    }

    fn open_for_read(&self, address: &str) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(address).map_err(|e| Error::Open {
            address: address.to_string(),
            message: e.to_string(),
        })?;
        Ok(Box::new(file))
    }
}
