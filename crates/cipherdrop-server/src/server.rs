//! Storage tier lifecycle: startup reconciliation, metrics listener, HTTP server

use anyhow::{Context, Result};
use cipherdrop_core::config::ServerConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::metrics::{HealthState, Metrics, Registry};
use crate::routes::{router, AppState};
use crate::service::TransferService;

pub async fn run(config: ServerConfig) -> Result<()> {
    info!("storage tier starting");

    // Reconcile before the listener exists so no request sees a stale registry
    let service = TransferService::start(&config).context("opening data directory")?;
    let service = Arc::new(service);

    let mut registry = Registry::default();
    let metrics = Metrics::register(&mut registry);

    if let Some(addr) = config.metrics_addr.clone() {
        let state = HealthState {
            registry: Arc::new(registry),
            store: service.store().clone(),
        };
        tokio::spawn(async move {
            if let Err(e) = crate::metrics::serve(addr, state).await {
                error!("metrics server failed: {e}");
            }
        });
    }

    let app = router(AppState { service, metrics }, config.body_limit_bytes);

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(addr = %listener.local_addr()?, "HTTP: listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server")?;

    info!("storage tier stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
