//! # qBittorrent MCP Types
//!
//! This crate defines the common types and the [`TorrentRemote`] trait shared by the
//! qBittorrent WebUI controller and the tool server that exposes it.

use thiserror::Error;

mod report;
mod source;
mod torrent;

pub use report::{AddReport, FileOutcome, TrackerReport};
pub use source::TorrentSource;
pub use torrent::{HashSelector, PSEUDO_TRACKER_PREFIX, TorrentInfo, Tracker};

/// Error type for qBittorrent WebUI operations.
#[derive(Error, Debug)]
pub enum QbitError {
    /// The login exchange did not yield a session cookie.
    #[error("login failed, unable to get SID")]
    LoginFailed,

    /// Caller input could not be interpreted. Nothing was sent for the action.
    #[error("{0}")]
    InvalidInput(String),

    /// The WebUI answered with a status other than 200.
    #[error("status code {code}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, empty when none could be read.
        body: String,
    },

    /// Network-related errors (connection failures, timeouts, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// A 200 response whose body was not the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// TorrentRemote defines the remote-control surface of a qBittorrent WebUI.
///
/// Every call authenticates on its own; nothing is shared between calls.
#[allow(async_fn_in_trait)]
pub trait TorrentRemote {
    /// Upload every `.torrent` file named by `source`, one request per file.
    /// Per-file failures are reported in the [`AddReport`], not as errors.
    async fn add(&self, source: TorrentSource) -> Result<AddReport, QbitError>;
    /// Delete torrents. If `delete_files` is true, downloaded data is removed too.
    async fn delete(&self, hashes: &HashSelector, delete_files: bool) -> Result<(), QbitError>;
    /// Pause (stop) torrents.
    async fn pause(&self, hashes: &HashSelector) -> Result<(), QbitError>;
    /// Resume (start) torrents.
    async fn resume(&self, hashes: &HashSelector) -> Result<(), QbitError>;
    /// Announce URLs of a torrent, with DHT/PeX/LSD pseudo-trackers removed.
    async fn trackers(&self, hash: &str) -> Result<TrackerReport, QbitError>;
    /// Set the global download limit in bytes/second.
    async fn set_global_download_limit(&self, limit: i64) -> Result<(), QbitError>;
    /// Set the global upload limit in bytes/second.
    async fn set_global_upload_limit(&self, limit: i64) -> Result<(), QbitError>;
    /// Application version string, e.g. `v5.0.3`.
    async fn version(&self) -> Result<String, QbitError>;
    /// Set the priority of one or more files (`ids` separated by `|`) of a torrent.
    async fn set_file_priority(&self, hash: &str, ids: &str, priority: i64)
    -> Result<(), QbitError>;
    /// Set the per-torrent download limit in bytes/second.
    async fn set_torrent_download_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError>;
    /// Set the per-torrent upload limit in bytes/second.
    async fn set_torrent_upload_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError>;
    /// Add tracker URLs to a torrent.
    async fn add_trackers(&self, hash: &str, urls: &[String]) -> Result<(), QbitError>;
    /// Add tags to torrents.
    async fn add_tags(&self, hashes: &HashSelector, tags: &[String]) -> Result<(), QbitError>;
    /// List all torrents.
    async fn list(&self) -> Result<Vec<TorrentInfo>, QbitError>;
}
