//! cipherdrop-relay: cipherdrop relay tier
//!
//! Usage:
//!   cipherdrop-relay [--config ./cipherdrop.toml] [--backend-url http://10.0.0.2:8080]

use anyhow::Result;
use cipherdrop_core::{config::CipherdropConfig, logging::LogFormat};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cipherdrop-relay", version, about = "cipherdrop relay tier")]
struct Cli {
    /// Path to cipherdrop.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "CIPHERDROP_CONFIG",
        default_value = "cipherdrop.toml"
    )]
    config: PathBuf,

    /// Override [relay].listen
    #[arg(long)]
    listen: Option<String>,

    /// Override [relay].backend_url
    #[arg(long, env = "CIPHERDROP_BACKEND_URL")]
    backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides [log].level
    #[arg(long, env = "CIPHERDROP_LOG")]
    log: Option<String>,

    /// Log format (json, text); overrides [log].format
    #[arg(long, env = "CIPHERDROP_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = CipherdropConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.relay.listen = listen;
    }
    if let Some(backend_url) = cli.backend_url {
        config.relay.backend_url = backend_url;
    }

    let level = cli.log.unwrap_or_else(|| config.log.level.clone());
    cipherdrop_core::logging::init_logging(&level, cli.log_format.unwrap_or(config.log.format));

    if !cli.config.exists() {
        warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        listen = %config.relay.listen,
        "cipherdrop-relay starting"
    );

    cipherdrop_relay::server::run(config.relay).await
}
