//! cipherdrop-core: types shared by the storage tier, the relay, and clients

pub mod api;
pub mod config;
pub mod logging;
pub mod names;

pub use names::{validate_file_name, NameError};
