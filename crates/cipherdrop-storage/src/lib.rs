//! cipherdrop-storage: the storage tier's plaintext file store and the
//! durable filename registry kept in step with it.
//!
//! The file store is the source of truth for content. The registry is
//! rebuilt from the store's directory listing at startup and is the index
//! used to reject duplicate names afterwards.

pub mod catalog;
pub mod error;
pub mod file_store;
pub mod health;
pub mod registry;

pub use catalog::{Catalog, Claim};
pub use error::{StorageError, StorageResult};
pub use file_store::FileStore;
pub use health::check_health;
pub use registry::{ReconcileReport, Registry};
