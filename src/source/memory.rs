//! In-memory source tree for embedding callers and tests.

use super::RemoteFileSource;
use crate::models::RemoteEntry;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

#[derive(Debug, Clone)]
enum MemoryNode {
    Directory { modified_ms: i64 },
    File { data: Vec<u8>, modified_ms: i64 },
}

/// Source whose tree lives entirely in memory.
///
/// Addresses are `/`-separated; `""` and `"/"` both name the root. Children
/// are listed in name order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    nodes: BTreeMap<String, MemoryNode>,
}

/// Canonical form: leading slash, no trailing slash, no empty components.
fn normalize(address: &str) -> String {
    let parts: Vec<&str> = address.split('/').filter(|p| !p.is_empty()).collect();
    format!("/{}", parts.join("/"))
}

fn parent_of(key: &str) -> Option<&str> {
    if key == "/" {
        return None;
    }
    key.rsplit_once('/')
        .map(|(parent, _)| if parent.is_empty() { "/" } else { parent })
}

fn name_of(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, name)| name)
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemorySource::insert_file`].
    #[must_use]
    pub fn with_file(mut self, path: &str, data: impl Into<Vec<u8>>, modified_ms: i64) -> Self {
        self.insert_file(path, data, modified_ms);
        self
    }

    /// Builder form of [`MemorySource::insert_dir`].
    #[must_use]
    pub fn with_dir(mut self, path: &str, modified_ms: i64) -> Self {
        self.insert_dir(path, modified_ms);
        self
    }

    /// Add or replace a file, creating missing parent directories.
    pub fn insert_file(&mut self, path: &str, data: impl Into<Vec<u8>>, modified_ms: i64) {
        let key = normalize(path);
        self.ensure_parents(&key, modified_ms);
        self.nodes.insert(
            key,
            MemoryNode::File {
                data: data.into(),
                modified_ms,
            },
        );
    }

    /// Add a directory, creating missing parent directories.
    pub fn insert_dir(&mut self, path: &str, modified_ms: i64) {
        let key = normalize(path);
        if key == "/" {
            return;
        }
        self.ensure_parents(&key, modified_ms);
        self.nodes
            .entry(key)
            .or_insert(MemoryNode::Directory { modified_ms });
    }

    /// Remove a node and everything below it.
    pub fn remove(&mut self, path: &str) {
        let key = normalize(path);
        let prefix = format!("{key}/");
        self.nodes
            .retain(|candidate, _| candidate != &key && !candidate.starts_with(&prefix));
    }

    fn ensure_parents(&mut self, key: &str, modified_ms: i64) {
        let mut current = parent_of(key);
        while let Some(parent) = current {
            if parent == "/" {
                break;
            }
            self.nodes
                .entry(parent.to_string())
                .or_insert(MemoryNode::Directory { modified_ms });
            current = parent_of(parent);
        }
    }

    fn is_directory(&self, key: &str) -> bool {
        key == "/" || matches!(self.nodes.get(key), Some(MemoryNode::Directory { .. }))
    }
}

impl RemoteFileSource for MemorySource {
    fn list_children(&self, address: &str) -> Result<Vec<RemoteEntry>> {
        let key = normalize(address);
        if !self.is_directory(&key) {
            return Err(Error::Listing {
                address: address.to_string(),
                message: "no such directory".to_string(),
            });
        }

        let children = self
            .nodes
            .iter()
            .filter(|(path, _)| parent_of(path) == Some(key.as_str()))
            .map(|(path, node)| {
                let (is_directory, size, modified_ms) = match node {
                    MemoryNode::Directory { modified_ms } => (true, 0, *modified_ms),
                    MemoryNode::File { data, modified_ms } => {
                        (false, data.len() as u64, *modified_ms)
                    }
                };
                RemoteEntry {
                    name: name_of(path).to_string(),
                    full_path: path.clone(),
                    is_directory,
                    size,
                    modified_at_epoch_millis: modified_ms,
                }
            })
            .collect();

        Ok(children)
    }

    fn open_for_read(&self, address: &str) -> Result<Box<dyn Read + Send>> {
        match self.nodes.get(&normalize(address)) {
            Some(MemoryNode::File { data, .. }) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(MemoryNode::Directory { .. }) => Err(Error::Open {
                address: address.to_string(),
                message: "is a directory".to_string(),
            }),
            None => Err(Error::Open {
                address: address.to_string(),
                message: "no such file".to_string(),
            }),
        }
    }
}
