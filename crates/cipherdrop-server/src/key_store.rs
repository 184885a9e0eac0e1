//! Process-wide shared key: one guarded cell, replaced by every handshake

use cipherdrop_crypto::SharedKey;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared reference to the current session key (None until the first handshake)
pub type SharedKeyStore = Arc<RwLock<Option<SharedKey>>>;

/// Create a new empty shared key store
pub fn new_shared() -> SharedKeyStore {
    Arc::new(RwLock::new(None))
}
