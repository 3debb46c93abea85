//! Integration test for QbitClient with a chained sequence against a live WebUI:
//! version -> add -> list -> trackers -> tags -> pause -> resume -> limits -> delete.
//! Requires a running qBittorrent and environment configuration:
//! - QBITTORRENT_HOST (default: http://127.0.0.1:8080)
//! - QBITTORRENT_USERNAME (default: admin)
//! - QBITTORRENT_PASSWORD (default: adminadmin)
//! - QBITTORRENT_TEST_TORRENT: path to a real .torrent file. Without it the add and
//!   per-torrent steps are skipped.

#![allow(unused_crate_dependencies)]

use std::env;

use qbit_mcp_controller::{QbitClient, QbitConfig};
use qbit_mcp_types::{HashSelector, TorrentRemote, TorrentSource};

#[tokio::test]
#[test_log::test]
#[ignore = "needs a running qBittorrent WebUI"]
async fn qbittorrent_controller_chained_flow() {
    // Arrange client
    let client =
        QbitClient::try_new(&QbitConfig::from_env()).expect("failed to initialize QbitClient");

    // 1. Version doubles as a login check
    let version = client.version().await.expect("failed to get version");
    assert!(!version.is_empty());

    // 2. Global limits, reset to unlimited afterwards
    client
        .set_global_download_limit(1_048_576)
        .await
        .expect("failed to set download limit");
    client
        .set_global_upload_limit(0)
        .await
        .expect("failed to set upload limit");
    client
        .set_global_download_limit(0)
        .await
        .expect("failed to reset download limit");

    let Ok(torrent_file) = env::var("QBITTORRENT_TEST_TORRENT") else {
        return;
    };
    let before: Vec<String> = client
        .list()
        .await
        .expect("failed to list torrents")
        .into_iter()
        .map(|t| t.hash)
        .collect();

    // 3. Add the torrent
    let report = client
        .add(TorrentSource::LiteralPath(torrent_file))
        .await
        .expect("failed to add torrent");
    assert!(report.any_added(), "{report}");

    // 4. Find it in the listing. qBittorrent adds asynchronously.
    let mut added = None;
    for _ in 0..20 {
        let list = client.list().await.expect("failed to list torrents");
        added = list.into_iter().find(|t| !before.contains(&t.hash));
        if added.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    }
    let added = added.expect("added torrent not found in list");
    let ours = HashSelector::Hashes(vec![added.hash.clone()]);

    // 5. Trackers, tags and per-torrent limits
    let _trackers = client
        .trackers(&added.hash)
        .await
        .expect("failed to fetch trackers");
    client
        .add_tags(&ours, &["qbit-mcp-test".to_string()])
        .await
        .expect("failed to add tags");
    client
        .set_torrent_upload_limit(&ours, 10_240)
        .await
        .expect("failed to set torrent upload limit");

    // 6. Pause and resume
    client.pause(&ours).await.expect("failed to pause torrent");
    client.resume(&ours).await.expect("failed to resume torrent");

    // 7. Delete without removing data
    client
        .delete(&ours, false)
        .await
        .expect("failed to delete torrent");
}
