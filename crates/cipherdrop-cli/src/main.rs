//! cipherdrop: command-line client
//!
//! Commands:
//!   upload <path> [--name <name>]       - seal a local file and upload it
//!   download <name> [--output <path>]   - fetch a file and open it locally
//!   list                                - list files held by the storage tier
//!
//! Every invocation performs a fresh key exchange through the relay first.

use anyhow::{Context, Result};
use cipherdrop_client::Client;
use cipherdrop_core::logging::{init_logging, LogFormat};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cipherdrop",
    version,
    about = "cipherdrop end-to-end encrypted file drop client",
    long_about = "cipherdrop: exchange a key with the storage tier through a relay, then upload \
                  and download files that stay encrypted on the wire"
)]
struct Cli {
    /// Relay base URL
    #[arg(long, env = "CIPHERDROP_RELAY", default_value = "http://127.0.0.1:3001")]
    relay: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "CIPHERDROP_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a local file and upload it
    Upload {
        /// Local file to upload
        path: PathBuf,
        /// Name to store it under (default: the file's own name)
        #[arg(long, short = 'n')]
        name: Option<String>,
    },

    /// Download a file and decrypt it locally
    Download {
        /// Name of the stored file
        name: String,
        /// Destination path (default: ./<name>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List stored files
    List,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log, LogFormat::Text);

    let mut client = Client::new(&cli.relay)?;
    let spinner = make_spinner("handshake");
    spinner.set_message(cli.relay.clone());
    client
        .handshake()
        .await
        .with_context(|| format!("key exchange via {}", cli.relay))?;
    spinner.finish_and_clear();

    match cli.command {
        Commands::Upload { path, name } => cmd_upload(&client, &path, name.as_deref()).await,
        Commands::Download { name, output } => {
            cmd_download(&client, &name, output.as_deref()).await
        }
        Commands::List => cmd_list(&client).await,
    }
}

// ── Progress helpers ──────────────────────────────────────────────────────────

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `cipherdrop upload` ───────────────────────────────────────────────────────

async fn cmd_upload(client: &Client, path: &Path, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(n) => n.to_string(),
        None => default_name(path)?,
    };
    let contents = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let pb = make_spinner("upload");
    pb.set_message(format!("{name} ({})", fmt_bytes(contents.len() as u64)));
    let result = client.upload(&name, &contents).await;
    pb.finish_and_clear();

    let message = result?;
    println!("{message}");
    println!("  name:   {name}");
    println!("  bytes:  {}", fmt_bytes(contents.len() as u64));
    Ok(())
}

// ── `cipherdrop download` ─────────────────────────────────────────────────────

async fn cmd_download(client: &Client, name: &str, output: Option<&Path>) -> Result<()> {
    let dest = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(name));

    let pb = make_spinner("download");
    pb.set_message(name.to_string());
    let result = client.download(name).await;
    pb.finish_and_clear();

    let contents = result?;
    tokio::fs::write(&dest, &contents)
        .await
        .with_context(|| format!("writing {}", dest.display()))?;

    println!("Downloaded {name}");
    println!("  saved:  {}", dest.display());
    println!("  bytes:  {}", fmt_bytes(contents.len() as u64));
    Ok(())
}

// ── `cipherdrop list` ─────────────────────────────────────────────────────────

async fn cmd_list(client: &Client) -> Result<()> {
    let files = client.list().await?;
    if files.is_empty() {
        println!("(no files)");
    }
    for name in files {
        println!("{name}");
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn default_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("cannot derive a file name from {}", path.display()))
}

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
