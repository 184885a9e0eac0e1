//! cipherdrop-server: cipherdrop storage tier
//!
//! Usage:
//!   cipherdrop-server [--config ./cipherdrop.toml] [--listen 0.0.0.0:8080]

use anyhow::Result;
use cipherdrop_core::{config::CipherdropConfig, logging::LogFormat};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cipherdrop-server", version, about = "cipherdrop storage tier")]
struct Cli {
    /// Path to cipherdrop.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "CIPHERDROP_CONFIG",
        default_value = "cipherdrop.toml"
    )]
    config: PathBuf,

    /// Override [server].listen
    #[arg(long)]
    listen: Option<String>,

    /// Override [server].data_dir
    #[arg(long)]
    data_dir: Option<PathBuf>,

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
        config.server.listen = listen;
    }
    if let Some(data_dir) = cli.data_dir {
        config.server.data_dir = data_dir;
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
        listen = %config.server.listen,
        "cipherdrop-server starting"
    );

    cipherdrop_server::server::run(config.server).await
}
