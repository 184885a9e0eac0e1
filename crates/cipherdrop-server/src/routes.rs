use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    routing::{get, post},
    Json, Router,
};
use cipherdrop_core::api::{
    decode_public_key, encode_public_key, paths, DownloadResponse, ExchangeKeysRequest,
    ExchangeKeysResponse, MessageResponse, UploadRequest, WireEnvelope,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::TransferResult;
use crate::metrics::{healthz_handler, Metrics, Operation, Outcome};
use crate::service::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransferService>,
    pub metrics: Metrics,
}

/// Build the storage tier's HTTP API. Bodies over `body_limit` get 413; any
/// other unreadable body is a generic 500.
pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route(paths::EXCHANGE_KEYS, post(exchange_keys))
        .route(paths::UPLOAD, post(upload))
        .route("/api/download/{file_name}", get(download))
        .route(paths::FILES, get(list_files))
        .route(paths::HEALTHZ, get(healthz_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn exchange_keys(
    State(state): State<AppState>,
    body: Result<Json<ExchangeKeysRequest>, JsonRejection>,
) -> TransferResult<Json<ExchangeKeysResponse>> {
    let result: TransferResult<Vec<u8>> = async {
        let Json(req) = body?;
        let remote = decode_public_key(&req.public_key)?;
        state.service.exchange_keys(&remote).await
    }
    .await;
    state.metrics.observe(Operation::ExchangeKeys, &result);

    Ok(Json(ExchangeKeysResponse {
        public_key: encode_public_key(&result?),
    }))
}

async fn upload(
    State(state): State<AppState>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> TransferResult<Json<MessageResponse>> {
    let result: TransferResult<usize> = async {
        let Json(req) = body?;
        let envelope = req.envelope.decode()?;
        state.service.upload(&req.filename, &envelope).await?;
        Ok(envelope.ciphertext.len())
    }
    .await;
    state.metrics.observe(Operation::Upload, &result);
    state.metrics.add_uploaded_bytes(result?);

    Ok(Json(MessageResponse {
        message: "File uploaded successfully".into(),
    }))
}

async fn download(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> TransferResult<Json<DownloadResponse>> {
    let result = state.service.download(&file_name).await;
    state.metrics.observe(Operation::Download, &result);

    Ok(Json(DownloadResponse {
        envelope: WireEnvelope::encode(&result?),
        message: None,
    }))
}

async fn list_files(State(state): State<AppState>) -> Json<Vec<String>> {
    let files = state.service.list_files();
    state.metrics.record(Operation::ListFiles, Outcome::Ok);
    Json(files)
}
