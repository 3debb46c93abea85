//! # Torrent controller using the qBittorrent WebUI API.
//!
//! usage:
//!
//! ```rust,ignore
//! use qbit_mcp_controller::{QbitClient, QbitConfig};
//! use qbit_mcp_types::TorrentRemote;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QbitClient::try_new(&QbitConfig::from_env())?;
//!     println!("qBittorrent {}", client.version().await?);
//!     let report = client.add(r#"["path/to/file.torrent"]"#.parse()?).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!

mod client;
mod config;
mod conversions;
mod ops;
#[cfg(test)]
mod testutil;

#[cfg(test)]
use tracing_subscriber as _;

pub use client::QbitClient;
pub use config::{DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_TIMEOUT, DEFAULT_USERNAME, QbitConfig};
pub use ops::HttpWebApi;
