use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// URL prefix the WebUI uses for the DHT, PeX and LSD rows of a tracker list.
pub const PSEUDO_TRACKER_PREFIX: &str = "** [";

/// Which torrents an operation applies to.
///
/// On the wire this is either the literal `all` or hashes separated by `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashSelector {
    /// Every torrent.
    All,
    /// The listed info-hashes.
    Hashes(Vec<String>),
}

impl HashSelector {
    /// Whether this selects every torrent.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl FromStr for HashSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "all" {
            return Ok(Self::All);
        }
        Ok(Self::Hashes(
            s.split('|')
                .map(str::trim)
                .filter(|hash| !hash.is_empty())
                .map(String::from)
                .collect(),
        ))
    }
}

impl fmt::Display for HashSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Hashes(hashes) => f.write_str(&hashes.join("|")),
        }
    }
}

/// One row of `/api/v2/torrents/trackers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracker {
    /// Announce URL, or a `** [DHT] **` style marker for pseudo-trackers.
    pub url: String,
    /// Tracker status code as reported by the WebUI.
    #[serde(default)]
    pub status: i64,
    /// Last tracker message.
    #[serde(default)]
    pub msg: String,
    /// Peers reported by this tracker, `-1` when unknown.
    #[serde(default)]
    pub num_peers: i64,
}

impl Tracker {
    /// Whether this row stands for DHT, PeX or LSD rather than a real tracker.
    pub fn is_pseudo(&self) -> bool {
        self.url.starts_with(PSEUDO_TRACKER_PREFIX)
    }
}

/// One row of `/api/v2/torrents/info`.
///
/// Only the commonly used fields are typed; everything else the WebUI sends
/// is kept in `extra` so the row serializes back without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TorrentInfo {
    pub hash: String,

    pub name: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub progress: f64,

    #[serde(default)]
    pub size: i64,

    #[serde(default)]
    pub dlspeed: i64,

    #[serde(default)]
    pub upspeed: i64,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub tags: String,

    #[serde(default)]
    pub save_path: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
