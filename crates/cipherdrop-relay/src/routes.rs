use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cipherdrop_core::api::{
    paths, DownloadResponse, ExchangeKeysRequest, ExchangeKeysResponse, MessageResponse,
    UploadRequest,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::RelayResult;
use crate::service::RelayService;

/// Same surface as the storage tier, so clients cannot tell the hops apart.
pub fn router(relay: Arc<RelayService>, body_limit: usize) -> Router {
    Router::new()
        .route(paths::EXCHANGE_KEYS, post(exchange_keys))
        .route(paths::UPLOAD, post(upload))
        .route("/api/download/{file_name}", get(download))
        .route(paths::FILES, get(list_files))
        .route(paths::HEALTHZ, get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(relay)
}

async fn exchange_keys(
    State(relay): State<Arc<RelayService>>,
    body: Result<Json<ExchangeKeysRequest>, JsonRejection>,
) -> RelayResult<Json<ExchangeKeysResponse>> {
    let Json(req) = body?;
    relay.exchange_keys(&req).await.map(Json)
}

async fn upload(
    State(relay): State<Arc<RelayService>>,
    body: Result<Json<UploadRequest>, JsonRejection>,
) -> RelayResult<Json<MessageResponse>> {
    let Json(req) = body?;
    relay.upload(&req).await.map(Json)
}

async fn download(
    State(relay): State<Arc<RelayService>>,
    Path(file_name): Path<String>,
) -> RelayResult<Json<DownloadResponse>> {
    relay.download(&file_name).await.map(Json)
}

async fn list_files(State(relay): State<Arc<RelayService>>) -> RelayResult<Json<Vec<String>>> {
    relay.list_files().await.map(Json)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
