//! Storage health check

use crate::error::{StorageError, StorageResult};
use crate::file_store::FileStore;

/// Verify the store directory is still present and listable
pub async fn check_health(store: &FileStore) -> StorageResult<()> {
    // Listing the root is the lightest check that covers permissions too
    let root = store.root().to_path_buf();
    tokio::fs::read_dir(&root)
        .await
        .map(|_| ())
        .map_err(|e| StorageError::io(root, e))
}

/// Returns true if the store is usable, false otherwise (non-panicking)
pub async fn is_healthy(store: &FileStore) -> bool {
    check_health(store).await.is_ok()
}
