//! cipherdrop-server: the storage tier
//!
//! Answers the key exchange, opens uploaded envelopes into the plaintext file
//! store, and re-seals files on download under the current shared key.

pub mod error;
pub mod key_store;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod service;

pub use error::{TransferError, TransferResult};
pub use routes::{router, AppState};
pub use service::TransferService;
