//! A scripted [`TorrentRemote`] for tool and server tests.

use std::sync::Mutex;

use serde_json::json;

use qbit_mcp_types::{
    AddReport, FileOutcome, HashSelector, QbitError, TorrentInfo, TorrentRemote, TorrentSource,
    Tracker, TrackerReport,
};

/// Records every call as a line and answers from canned data, or fails every call
/// with the error built by `fail`.
#[derive(Debug, Default)]
pub(crate) struct FakeRemote {
    pub(crate) fail: Option<fn() -> QbitError>,
    pub(crate) calls: Mutex<Vec<String>>,
    pub(crate) report: AddReport,
    pub(crate) trackers: Vec<Tracker>,
    pub(crate) torrents: Vec<TorrentInfo>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self {
            report: AddReport {
                outcomes: vec![FileOutcome::Added {
                    file_name: "ubuntu.torrent".into(),
                }],
            },
            trackers: vec![tracker("** [DHT] **"), tracker("udp://tracker.example:80")],
            torrents: vec![
                serde_json::from_value(json!({
                    "hash": "8c212779b4abde7c6bc608063a0d008b7e40ce32",
                    "name": "debian-12.iso",
                    "state": "uploading",
                    "progress": 1.0,
                    "ratio": 1.7
                }))
                .unwrap(),
            ],
            ..Default::default()
        }
    }

    pub(crate) fn failing(fail: fn() -> QbitError) -> Self {
        Self {
            fail: Some(fail),
            ..Self::new()
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), QbitError> {
        self.calls.lock().unwrap().push(call);
        match self.fail {
            Some(fail) => Err(fail()),
            None => Ok(()),
        }
    }
}

pub(crate) fn tracker(url: &str) -> Tracker {
    serde_json::from_value(json!({ "url": url })).unwrap()
}

impl TorrentRemote for FakeRemote {
    async fn add(&self, source: TorrentSource) -> Result<AddReport, QbitError> {
        self.record(format!("add {source:?}"))?;
        Ok(self.report.clone())
    }

    async fn delete(&self, hashes: &HashSelector, delete_files: bool) -> Result<(), QbitError> {
        self.record(format!("delete {hashes} {delete_files}"))
    }

    async fn pause(&self, hashes: &HashSelector) -> Result<(), QbitError> {
        self.record(format!("pause {hashes}"))
    }

    async fn resume(&self, hashes: &HashSelector) -> Result<(), QbitError> {
        self.record(format!("resume {hashes}"))
    }

    async fn trackers(&self, hash: &str) -> Result<TrackerReport, QbitError> {
        self.record(format!("trackers {hash}"))?;
        Ok(self.trackers.clone().into())
    }

    async fn set_global_download_limit(&self, limit: i64) -> Result<(), QbitError> {
        self.record(format!("global_download_limit {limit}"))
    }

    async fn set_global_upload_limit(&self, limit: i64) -> Result<(), QbitError> {
        self.record(format!("global_upload_limit {limit}"))
    }

    async fn version(&self) -> Result<String, QbitError> {
        self.record("version".into())?;
        Ok("v5.0.3".into())
    }

    async fn set_file_priority(
        &self,
        hash: &str,
        ids: &str,
        priority: i64,
    ) -> Result<(), QbitError> {
        self.record(format!("file_priority {hash} {ids} {priority}"))
    }

    async fn set_torrent_download_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError> {
        self.record(format!("torrent_download_limit {hashes} {limit}"))
    }

    async fn set_torrent_upload_limit(
        &self,
        hashes: &HashSelector,
        limit: i64,
    ) -> Result<(), QbitError> {
        self.record(format!("torrent_upload_limit {hashes} {limit}"))
    }

    async fn add_trackers(&self, hash: &str, urls: &[String]) -> Result<(), QbitError> {
        self.record(format!("add_trackers {hash} {urls:?}"))
    }

    async fn add_tags(&self, hashes: &HashSelector, tags: &[String]) -> Result<(), QbitError> {
        self.record(format!("add_tags {hashes} {tags:?}"))
    }

    async fn list(&self) -> Result<Vec<TorrentInfo>, QbitError> {
        self.record("list".into())?;
        Ok(self.torrents.clone())
    }
}
