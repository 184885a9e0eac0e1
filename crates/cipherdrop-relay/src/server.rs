//! Relay lifecycle: build the forwarder, bind, serve until ctrl-c

use anyhow::{Context, Result};
use cipherdrop_core::config::RelayConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::routes::router;
use crate::service::RelayService;

pub async fn run(config: RelayConfig) -> Result<()> {
    info!("relay starting");

    let relay = Arc::new(RelayService::new(&config)?);
    let app = router(relay, config.body_limit_bytes);

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(
        addr = %listener.local_addr()?,
        backend = %config.backend_url,
        "HTTP: listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server")?;

    info!("relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
