//! Plaintext file store: one flat directory, one file per uploaded name.
//!
//! Writes land in a sibling staging directory first and are renamed into
//! place, so a crash mid-write never leaves a truncated file under a real
//! name. Both directories must live on the same filesystem.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use cipherdrop_core::validate_file_name;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    staging: PathBuf,
}

impl FileStore {
    /// Create (if needed) the store and staging directories. Leftover staging
    /// files from an interrupted write are discarded.
    pub fn open(root: &Path, staging: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(root).map_err(|e| StorageError::io(root, e))?;
        std::fs::create_dir_all(staging).map_err(|e| StorageError::io(staging, e))?;

        let entries = std::fs::read_dir(staging).map_err(|e| StorageError::io(staging, e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), "could not remove stale staging file: {e}");
            } else {
                debug!(path = %path.display(), "removed stale staging file");
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            staging: staging.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `name` inside the store, refusing anything that is not a single
    /// plain path component.
    pub fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        Ok(self.root.join(validate_file_name(name)?))
    }

    /// Names of the regular files currently in the store.
    ///
    /// Entries that are not valid UTF-8, or that could never have been
    /// uploaded under their name, are skipped with a warning.
    pub fn list_names(&self) -> StorageResult<BTreeSet<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, e))?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StorageError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if validate_file_name(&name).is_ok() => {
                    names.insert(name);
                }
                Ok(name) => warn!(name = %name, "skipping file with unusable name"),
                Err(raw) => warn!(name = ?raw, "skipping file with non UTF-8 name"),
            }
        }
        Ok(names)
    }

    /// Write `contents` under `name`, replacing nothing on failure.
    pub async fn write(&self, name: &str, contents: &[u8]) -> StorageResult<()> {
        let dest = self.path_for(name)?;
        let tmp = self.staging.join(uuid::Uuid::new_v4().to_string());

        if let Err(e) = tokio::fs::write(&tmp, contents).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &dest).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(&dest, e));
        }

        debug!(name = %name, bytes = contents.len(), "stored file");
        Ok(())
    }

    pub async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}
