use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The peer's public key is not a valid point on P-521.
    #[error("handshake failed: remote public key is not a valid curve point")]
    InvalidPublicKey,

    /// Tag mismatch, wrong key, or malformed envelope. Never more specific.
    #[error("envelope decryption failed")]
    Decryption,

    #[error("envelope encryption failed")]
    Encryption,

    #[error("shared key derivation failed")]
    KeyDerivation,
}
