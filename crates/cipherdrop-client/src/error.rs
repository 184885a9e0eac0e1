use cipherdrop_crypto::CryptoError;
use thiserror::Error;

/// The user-facing outcomes a client distinguishes.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("File already exists. Please try a different file.")]
    Duplicate,

    #[error("File is too large. The limit is 50MB. Please try a different file.")]
    TooLarge,

    #[error("request failed: {0}")]
    Failed(String),

    #[error("crypto: {0}")]
    Crypto(#[from] CryptoError),

    #[error("no session key, run the handshake first")]
    NoSession,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Only 409 and 413 carry their own meaning; every other status is a
    /// generic failure.
    pub fn from_status(status: u16, detail: &str) -> Self {
        match status {
            409 => ClientError::Duplicate,
            413 => ClientError::TooLarge,
            _ if detail.is_empty() => ClientError::Failed(format!("HTTP {status}")),
            _ => ClientError::Failed(format!("HTTP {status}: {detail}")),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Failed(e.to_string())
    }
}
