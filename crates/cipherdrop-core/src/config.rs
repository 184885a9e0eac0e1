use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::MAX_BODY_BYTES;
use crate::logging::LogFormat;

/// Top-level configuration (loaded from cipherdrop.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherdropConfig {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub log: LogConfig,
}

/// Storage tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address (default: 127.0.0.1:8080)
    pub listen: String,
    /// Holds `uploads/`, `staging/` and `registry.json`
    pub data_dir: PathBuf,
    /// Request body cap in bytes (default: 50 MiB)
    pub body_limit_bytes: usize,
    /// Prometheus endpoint, disabled when unset
    pub metrics_addr: Option<String>,
}

/// Relay tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP listen address (default: 127.0.0.1:3001)
    pub listen: String,
    /// Base URL of the storage tier
    pub backend_url: String,
    /// Upper bound on each relay → backend call
    pub timeout_secs: u64,
    /// Encrypted envelopes mirrored after successful uploads
    pub uploads_mirror: PathBuf,
    /// Encrypted envelopes mirrored after successful downloads
    pub downloads_mirror: PathBuf,
    /// Request body cap in bytes (default: 50 MiB)
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level or EnvFilter directive (default: info)
    pub level: String,
    pub format: LogFormat,
}

impl ServerConfig {
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.data_dir.join("staging")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join("registry.json")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".into(),
            data_dir: PathBuf::from("./data"),
            body_limit_bytes: MAX_BODY_BYTES,
            metrics_addr: None,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3001".into(),
            backend_url: "http://127.0.0.1:8080".into(),
            timeout_secs: 30,
            uploads_mirror: PathBuf::from("./relay/uploads"),
            downloads_mirror: PathBuf::from("./relay/downloads"),
            body_limit_bytes: MAX_BODY_BYTES,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl CipherdropConfig {
    /// Read `path`, falling back to defaults when it does not exist.
    ///
    /// Runs before the log subscriber is installed, so reporting the fallback
    /// is left to the caller.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }
}
