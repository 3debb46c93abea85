//! # qBittorrent MCP Server
//!
//! ## Usage
//!
//! ```sh,ignore
//! QBITTORRENT_HOST=http://127.0.0.1:8080 cargo run --release --bin qbit-mcp
//! ```

use std::{
    env,
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use qbit_mcp_types as _;
use serde as _;
use serde_json as _;
use thiserror as _;
use tokio::{
    signal::unix::{SignalKind, signal},
    task::JoinHandle,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qbit_mcp_controller::{QbitClient, QbitConfig};
use qbit_mcp_server::McpServer;

#[cfg(test)]
use test_log as _;

mod cli;

use cli::Cli;

/// Fallback for `--log-file`.
const LOG_FILE_ENV: &str = "QBITTORRENT_MCP_LOG";

/// Initializes the tracing subscriber. Stdout carries the protocol, so logs go to
/// stderr or to `log_file`.
fn init_tracing(log_file: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Spawns and returns the signals listener task.
fn spawn_signal_listener() -> Result<JoinHandle<()>, Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let signals = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
    });

    Ok(signals)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| env::var_os(LOG_FILE_ENV).map(PathBuf::from));
    init_tracing(log_file.as_deref())?;

    let config = cli.apply(QbitConfig::from_env());
    info!("Starting qBittorrent MCP server for {}", config.host);
    let client = QbitClient::try_new(&config)?;
    let server = McpServer::new(client);

    let signals = spawn_signal_listener()?;

    tokio::select! {
        result = server.serve(tokio::io::stdin(), tokio::io::stdout()) => {
            if let Err(e) = result {
                error!("Stdio transport failed: {e}");
                return Err(e.into());
            }
        },
        _ = signals => info!("Received shutdown signal"),
    }

    Ok(())
}
