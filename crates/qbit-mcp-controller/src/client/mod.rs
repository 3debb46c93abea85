//! qBittorrent WebUI client implementation.

use std::path::Path;

use tracing::{debug, instrument};

use qbit_mcp_types::{
    AddReport, FileOutcome, HashSelector, QbitError, TorrentInfo, TorrentRemote, TorrentSource,
    Tracker, TrackerReport,
};

use crate::config::QbitConfig;
use crate::conversions::{decode_json, ensure_ok, trimmed_text};
use crate::ops::{ApiRequest, ApiResponse, HttpWebApi, Session, TorrentUpload, WebApiOps, endpoint};


/// QbitClient drives a qBittorrent WebUI.
///
/// Each operation logs in, sends exactly one request with the fresh session cookie and
/// classifies the response. Sessions are never cached or shared between operations.
#[allow(private_bounds)]
pub struct QbitClient<T: WebApiOps = HttpWebApi> {
    ops: T,
    username: String,
    password: String,
}

#[allow(private_bounds)]
impl<T: WebApiOps> std::fmt::Debug for QbitClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QbitClient")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl QbitClient {
    /// Create a new QbitClient for the WebUI described by `config`.
    ///
    /// No request is sent here; the first login happens with the first operation.
    pub fn try_new(config: &QbitConfig) -> Result<Self, QbitError> {
        debug!("Configuring qBittorrent WebUI client: {config:?}");
        let ops = HttpWebApi::try_new(&config.host, config.timeout)?;
        Ok(Self {
            ops,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[allow(private_bounds)]
impl<T: WebApiOps> QbitClient<T> {
    /// Create a QbitClient with a custom transport implementation.
    /// This is primarily useful for testing with mocks.
    #[cfg(test)]
    pub(crate) fn with_ops(ops: T) -> Self {
        Self {
            ops,
            username: crate::config::DEFAULT_USERNAME.into(),
            password: crate::config::DEFAULT_PASSWORD.into(),
        }
    }

    /// Logs in. A missing session ends the operation.
    async fn session(&self) -> Result<Session, QbitError> {
        self.ops
            .login(&self.username, &self.password)
            .await
            .ok_or(QbitError::LoginFailed)
    }

    /// Logs in, sends `request` and requires a 200.
    async fn call(&self, request: ApiRequest) -> Result<ApiResponse, QbitError> {
        let session = self.session().await?;
        debug!("{:?} {}", request.method, request.path);
        let response = self.ops.send(&session, request).await?;
        ensure_ok(response)
    }

    async fn upload(&self, session: &Session, path: String) -> FileOutcome {
        let file_path = Path::new(&path);
        if !tokio::fs::try_exists(file_path).await.unwrap_or(false) {
            debug!("Torrent file {path} does not exist");
            return FileOutcome::Missing { path };
        }

        let bytes = match tokio::fs::read(file_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return FileOutcome::Unreadable {
                    reason: e.to_string(),
                    path,
                };
            }
        };
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());

        debug!("Uploading {file_name} ({} bytes)", bytes.len());
        let request = ApiRequest::upload(
            endpoint::TORRENTS_ADD,
            TorrentUpload {
                file_name: file_name.clone(),
                bytes,
            },
        );
        match self.ops.send(session, request).await {
            Ok(response) if response.status == 200 => FileOutcome::Added { file_name },
            Ok(response) if response.status == 415 => FileOutcome::InvalidTorrent { file_name },
            Ok(response) => FileOutcome::Rejected {
                file_name,
                status: response.status,
            },
            Err(e) => FileOutcome::Failed {
                file_name,
                reason: e.to_string(),
            },
        }
    }
}

#[allow(private_bounds)]
impl<T: WebApiOps> TorrentRemote for QbitClient<T> {
    #[instrument(skip(self))]
    async fn add(&self, source: TorrentSource) -> Result<AddReport, QbitError> {
        let paths = source.into_paths();
        if paths.is_empty() {
            return Err(QbitError::InvalidInput(
                "No torrent file path provided".into(),
            ));
        }

        let session = self.session().await?;
        let mut report = AddReport::default();
        for path in paths {
            report.outcomes.push(self.upload(&session, path).await);
        }

        debug!("Added {report:?}");
        Ok(report)
    }

    #[instrument(skip(self))]
    async fn delete(&self, hashes: &HashSelector, delete_files: bool) -> Result<(), QbitError> {
        debug!("Deleting torrents {hashes}, delete_files={delete_files}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_DELETE,
            vec![
                ("hashes", hashes.to_string()),
                ("deleteFiles", delete_files.to_string()),
            ],
        ))
        .await?;
        debug!("Delete command sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn pause(&self, hashes: &HashSelector) -> Result<(), QbitError> {
        debug!("Pausing torrents {hashes}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_STOP,
            vec![("hashes", hashes.to_string())],
        ))
        .await?;
        debug!("Stop command sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resume(&self, hashes: &HashSelector) -> Result<(), QbitError> {
        debug!("Resuming torrents {hashes}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_START,
            vec![("hashes", hashes.to_string())],
        ))
        .await?;
        debug!("Start command sent");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn trackers(&self, hash: &str) -> Result<TrackerReport, QbitError> {
        debug!("Getting trackers for torrent {hash}");
        let response = self
            .call(ApiRequest::query(
                endpoint::TORRENTS_TRACKERS,
                vec![("hash", hash.to_string())],
            ))
            .await?;
        let trackers: Vec<Tracker> = decode_json(&response)?;
        debug!("Trackers for torrent {hash}: {trackers:?}");

        Ok(trackers.into())
    }

    #[instrument(skip(self))]
    async fn set_global_download_limit(&self, limit: i64) -> Result<(), QbitError> {
        debug!("Setting global download limit to {limit}");
        self.call(ApiRequest::form(
            endpoint::TRANSFER_DOWNLOAD_LIMIT,
            vec![("limit", limit.to_string())],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_global_upload_limit(&self, limit: i64) -> Result<(), QbitError> {
        debug!("Setting global upload limit to {limit}");
        self.call(ApiRequest::form(
            endpoint::TRANSFER_UPLOAD_LIMIT,
            vec![("limit", limit.to_string())],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn version(&self) -> Result<String, QbitError> {
        debug!("Getting application version");
        let response = self.call(ApiRequest::get(endpoint::APP_VERSION)).await?;
        Ok(trimmed_text(response))
    }

    #[instrument(skip(self))]
    async fn set_file_priority(
        &self,
        hash: &str,
        ids: &str,
        priority: i64,
    ) -> Result<(), QbitError> {
        debug!("Setting priority {priority} on files {ids} of torrent {hash}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_FILE_PRIO,
            vec![
                ("hash", hash.to_string()),
                ("id", ids.to_string()),
                ("priority", priority.to_string()),
            ],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_torrent_download_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError> {
        debug!("Setting download limit {limit} on torrents {hashes}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_DOWNLOAD_LIMIT,
            vec![("hashes", hashes.to_string()), ("limit", limit.to_string())],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_torrent_upload_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError> {
        debug!("Setting upload limit {limit} on torrents {hashes}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_UPLOAD_LIMIT,
            vec![("hashes", hashes.to_string()), ("limit", limit.to_string())],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_trackers(&self, hash: &str, urls: &[String]) -> Result<(), QbitError> {
        debug!("Adding trackers {urls:?} to torrent {hash}");
        // The WebUI expects one URL per line.
        self.call(ApiRequest::form(
            endpoint::TORRENTS_ADD_TRACKERS,
            vec![("hash", hash.to_string()), ("urls", urls.join("\n"))],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_tags(&self, hashes: &HashSelector, tags: &[String]) -> Result<(), QbitError> {
        debug!("Adding tags {tags:?} to torrents {hashes}");
        self.call(ApiRequest::form(
            endpoint::TORRENTS_ADD_TAGS,
            vec![("hashes", hashes.to_string()), ("tags", tags.join(","))],
        ))
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<TorrentInfo>, QbitError> {
        debug!("Listing torrents");
        let response = self.call(ApiRequest::get(endpoint::TORRENTS_INFO)).await?;
        let torrents: Vec<TorrentInfo> = decode_json(&response)?;
        debug!("Listed {} torrents", torrents.len());

        Ok(torrents)
    }
}
