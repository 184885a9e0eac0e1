//! Durable filename registry.
//!
//! Held in memory as an ordered set and written through to a JSON file on
//! every mutation (temp file + rename, so a crash never leaves a torn file).
//! Listing order is lexicographic, which is stable across restarts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// On-disk layout of `registry.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    files: BTreeSet<String>,
}

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Present on disk but previously untracked
    pub added: Vec<String>,
    /// Tracked but no longer on disk
    pub removed: Vec<String>,
}

pub struct Registry {
    path: PathBuf,
    files: BTreeSet<String>,
}

impl Registry {
    /// Load the registry at `path`, or start empty if it does not exist yet.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let files = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
            let file: RegistryFile =
                serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                    path: path.to_path_buf(),
                    source,
                })?;
            file.files
        } else {
            BTreeSet::new()
        };

        Ok(Registry {
            path: path.to_path_buf(),
            files,
        })
    }

    /// Replace the contents with exactly `actual` and persist.
    pub fn reconcile<I>(&mut self, actual: I) -> StorageResult<ReconcileReport>
    where
        I: IntoIterator<Item = String>,
    {
        let actual: BTreeSet<String> = actual.into_iter().collect();
        let report = ReconcileReport {
            added: actual.difference(&self.files).cloned().collect(),
            removed: self.files.difference(&actual).cloned().collect(),
        };

        let previous = std::mem::replace(&mut self.files, actual);
        if let Err(e) = self.persist() {
            self.files = previous;
            return Err(e);
        }
        Ok(report)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.files.contains(name)
    }

    /// Record a new name. Fails with `Duplicate` if it is already present; a
    /// failed write leaves the in-memory set unchanged as well.
    pub fn insert(&mut self, name: &str) -> StorageResult<()> {
        if !self.files.insert(name.to_string()) {
            return Err(StorageError::Duplicate(name.to_string()));
        }
        if let Err(e) = self.persist() {
            self.files.remove(name);
            return Err(e);
        }
        Ok(())
    }

    pub fn list_all(&self) -> Vec<String> {
        self.files.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let file = RegistryFile {
            files: self.files.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        // Atomic write: write to temp file, then rename
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json).map_err(|e| StorageError::io(&tmp_path, e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("path", &self.path)
            .field("len", &self.files.len())
            .finish()
    }
}
