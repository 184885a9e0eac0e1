//! cipherdrop-crypto: key agreement and file envelopes for cipherdrop
//!
//! Protocol:
//! ```text
//! client                                   storage tier
//!   P-521 ephemeral keypair  ── publicKey ──▶  P-521 ephemeral keypair
//!                            ◀── publicKey ──
//!   shared = ECDH(x-coordinate, 66 bytes)
//!   key    = HMAC-SHA256(key=shared, msg="encryption key")
//!
//! every file payload:
//!   AES-256-GCM(key, nonce=random 128-bit, no AAD) → { iv, data, authTag }
//! ```
//!
//! The relay in between only ever sees public points and envelopes.

pub mod envelope;
pub mod error;
pub mod handshake;
pub mod keys;

pub use envelope::{open, seal, Envelope};
pub use error::{CryptoError, CryptoResult};
pub use handshake::{respond, Handshake};
pub use keys::SharedKey;

/// Size of the symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an envelope nonce (128-bit, sent as `iv`)
pub const NONCE_SIZE: usize = 16;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;
