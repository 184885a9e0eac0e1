use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use cipherdrop_core::{
    api::MAX_BODY_BYTES,
    config::{RelayConfig, ServerConfig},
};
use cipherdrop_relay::RelayService;
use cipherdrop_server::{metrics::Metrics, AppState, TransferService};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Storage tier and relay on ephemeral ports, each with its own temp dir.
pub struct TestStack {
    pub relay_url: String,
    #[allow(dead_code)]
    pub server_url: String,
    pub data_dir: TempDir,
    pub relay_dir: TempDir,
}

#[allow(dead_code)]
impl TestStack {
    pub async fn start() -> Self {
        Self::start_with_limits(MAX_BODY_BYTES, MAX_BODY_BYTES).await
    }

    pub async fn start_with_limits(server_limit: usize, relay_limit: usize) -> Self {
        let data_dir = TempDir::new().unwrap();
        let server_addr = start_server(&data_dir, server_limit).await;
        let server_url = format!("http://{server_addr}");

        let relay_dir = TempDir::new().unwrap();
        let relay_url = start_relay(&relay_dir, &server_url, relay_limit).await;

        Self {
            relay_url,
            server_url,
            data_dir,
            relay_dir,
        }
    }

    /// A relay in front of an address nothing listens on.
    pub async fn relay_without_backend() -> (String, TempDir) {
        let dead = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let relay_dir = TempDir::new().unwrap();
        let url = start_relay(&relay_dir, &format!("http://{dead}"), MAX_BODY_BYTES).await;
        (url, relay_dir)
    }

    pub fn uploads_mirror(&self) -> PathBuf {
        self.relay_dir.path().join("uploads")
    }

    pub fn downloads_mirror(&self) -> PathBuf {
        self.relay_dir.path().join("downloads")
    }

    pub fn stored_file(&self, name: &str) -> PathBuf {
        self.data_dir.path().join("uploads").join(name)
    }
}

async fn start_server(data_dir: &TempDir, body_limit: usize) -> SocketAddr {
    let config = ServerConfig {
        data_dir: data_dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let state = AppState {
        service: Arc::new(TransferService::start(&config).unwrap()),
        metrics: Metrics::default(),
    };
    let app = cipherdrop_server::router(state, body_limit);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_relay(relay_dir: &TempDir, backend_url: &str, body_limit: usize) -> String {
    let config = RelayConfig {
        backend_url: backend_url.to_string(),
        timeout_secs: 5,
        uploads_mirror: relay_dir.path().join("uploads"),
        downloads_mirror: relay_dir.path().join("downloads"),
        ..RelayConfig::default()
    };
    let app = cipherdrop_relay::router(Arc::new(RelayService::new(&config).unwrap()), body_limit);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
