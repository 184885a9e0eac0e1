//! cipherdrop-relay: the middle tier
//!
//! Proxies the storage tier's API one-for-one and keeps a local copy of every
//! envelope it sees in the uploads and downloads mirrors. It never holds a key
//! and never decrypts.

pub mod error;
pub mod mirror;
pub mod routes;
pub mod server;
pub mod service;

pub use error::{RelayError, RelayResult};
pub use routes::router;
pub use service::RelayService;
