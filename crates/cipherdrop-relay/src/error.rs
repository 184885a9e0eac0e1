use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cipherdrop_core::{api::ErrorResponse, NameError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// The storage tier answered with a non-2xx status
    #[error("backend answered {status}: {message}")]
    Backend { status: StatusCode, message: String },

    #[error("backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("backend timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("invalid file name: {0}")]
    InvalidName(#[from] NameError),

    #[error("malformed backend response: {0}")]
    Malformed(String),

    #[error("request body rejected: {0}")]
    Body(#[from] JsonRejection),
}

pub type RelayResult<T> = Result<T, RelayError>;

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RelayError::Timeout(e)
        } else if e.is_decode() {
            RelayError::Malformed(e.to_string())
        } else {
            RelayError::Unreachable(e)
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RelayError::Backend { status, message } => {
                tracing::warn!(%status, "backend rejected request: {message}");
                (status, message)
            }
            RelayError::Body(rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                tracing::warn!("request body too large: {rejection}");
                (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large".to_string())
            }
            RelayError::InvalidName(e) => {
                tracing::warn!("rejected file name: {e}");
                (StatusCode::BAD_REQUEST, "Invalid filename".to_string())
            }
            other => {
                tracing::error!(error = %other, "forward failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
