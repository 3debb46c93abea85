//! # qBittorrent MCP Server
//!
//! Exposes the qBittorrent WebUI operations of [`qbit_mcp_types::TorrentRemote`] as
//! Model Context Protocol tools, spoken as newline-delimited JSON-RPC 2.0.
//!
//! ## Example
//!
//! ```rust,ignore
//! use qbit_mcp_controller::{QbitClient, QbitConfig};
//! use qbit_mcp_server::McpServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QbitClient::try_new(&QbitConfig::from_env())?;
//!     McpServer::new(client)
//!         .serve(tokio::io::stdin(), tokio::io::stdout())
//!         .await?;
//!     Ok(())
//! }
//! ```

use clap as _;
use dotenvy as _;
use qbit_mcp_controller as _;
use tracing_subscriber as _;

#[cfg(test)]
use test_log as _;

pub mod protocol;
mod server;
#[cfg(test)]
mod testutil;
mod tools;

pub use server::{DEFAULT_PROTOCOL_VERSION, McpServer, SERVER_NAME};
pub use tools::{ToolCallError, call_tool, descriptors};
