//! Shared test utilities and fixtures.

use std::path::{Path, PathBuf};

use crate::ops::{ApiResponse, MockWebApiOps, Session};

/// Minimal bencoded torrent. The WebUI is mocked, so it only has to look like one.
pub(crate) const TORRENT_BYTES: &[u8] = concat!(
    "d8:announce33:udp://tracker.example:80/announce",
    "4:infod6:lengthi5e4:name5:hello12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee",
)
.as_bytes();

pub(crate) const TRACKERS_JSON: &str = r#"[
    {"url":"** [DHT] **","status":2,"msg":"","num_peers":12},
    {"url":"** [PeX] **","status":2,"msg":"","num_peers":3},
    {"url":"** [LSD] **","status":2,"msg":"","num_peers":0},
    {"url":"udp://tracker.example:80","status":2,"msg":"","num_peers":40},
    {"url":"http://tracker.example/announce","status":4,"msg":"timed out","num_peers":-1}
]"#;

pub(crate) const TORRENTS_JSON: &str = r#"[
    {"hash":"8c212779b4abde7c6bc608063a0d008b7e40ce32","name":"debian-12.iso","state":"uploading",
     "progress":1.0,"size":658505728,"dlspeed":0,"upspeed":51200,"category":"linux","tags":"iso",
     "save_path":"/downloads","ratio":1.7},
    {"hash":"284b83c9c7935002391129fd97f43db5d7cc2ba0","name":"arch.iso","state":"downloading",
     "progress":0.25,"size":1200000000,"dlspeed":1048576,"upspeed":0,"category":"","tags":"",
     "save_path":"/downloads","ratio":0.0}
]"#;

pub(crate) fn make_test_session() -> Session {
    Session::new("SID=0123456789abcdef")
}

pub(crate) fn ok(body: &str) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: body.into(),
    }
}

pub(crate) fn status(code: u16, body: &str) -> ApiResponse {
    ApiResponse {
        status: code,
        body: body.into(),
    }
}

/// A mock whose login succeeds exactly `logins` times.
pub(crate) fn logged_in_mock(logins: usize) -> MockWebApiOps {
    let mut mock = MockWebApiOps::new();
    mock.expect_login()
        .times(logins)
        .returning(|_, _| Some(make_test_session()));
    mock
}

/// A mock whose login fails and which must never be asked to send anything.
pub(crate) fn login_failed_mock() -> MockWebApiOps {
    let mut mock = MockWebApiOps::new();
    mock.expect_login().times(1).returning(|_, _| None);
    mock.expect_send().times(0);
    mock
}

/// Writes a `.torrent` fixture into `dir` and returns its path.
pub(crate) fn write_torrent(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, TORRENT_BYTES).unwrap();
    path
}
