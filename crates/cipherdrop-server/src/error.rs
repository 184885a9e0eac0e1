//! Storage tier error taxonomy and its HTTP mapping.
//!
//! Clients only ever see a generic `{"error": ...}` body; the detail goes to
//! the log.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cipherdrop_core::{api::ErrorResponse, NameError};
use cipherdrop_crypto::CryptoError;
use cipherdrop_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("handshake rejected: {0}")]
    Handshake(CryptoError),

    #[error("envelope could not be opened")]
    Decryption,

    #[error("file name already exists: {0}")]
    DuplicateName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("invalid file name: {0}")]
    InvalidName(#[from] NameError),

    #[error("no shared key established, exchange keys first")]
    NoSharedKey,

    #[error("storage: {0}")]
    Storage(StorageError),

    #[error("encryption: {0}")]
    Crypto(CryptoError),

    #[error("request body rejected: {0}")]
    Body(#[from] JsonRejection),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type TransferResult<T> = Result<T, TransferError>;

impl From<StorageError> for TransferError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Duplicate(name) => TransferError::DuplicateName(name),
            StorageError::NotFound(name) => TransferError::NotFound(name),
            StorageError::InvalidName(e) => TransferError::InvalidName(e),
            other => TransferError::Storage(other),
        }
    }
}

impl From<CryptoError> for TransferError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidPublicKey => TransferError::Handshake(e),
            CryptoError::Decryption => TransferError::Decryption,
            other => TransferError::Crypto(other),
        }
    }
}

impl TransferError {
    pub fn status(&self) -> StatusCode {
        match self {
            TransferError::DuplicateName(_) => StatusCode::CONFLICT,
            TransferError::Body(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            TransferError::InvalidName(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::CONFLICT => "Filename already exists",
            StatusCode::PAYLOAD_TOO_LARGE => "Payload too large",
            StatusCode::BAD_REQUEST => "Invalid filename",
            _ => "Internal Server Error",
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
