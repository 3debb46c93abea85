use std::fmt;

use crate::Tracker;

/// Result of uploading a single path during an `add torrent` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The WebUI accepted the file.
    Added {
        /// Final path component of the uploaded file.
        file_name: String,
    },
    /// Nothing exists at the path.
    Missing {
        /// The path as given.
        path: String,
    },
    /// The path exists but could not be read.
    Unreadable {
        /// The path as given.
        path: String,
        /// I/O error description.
        reason: String,
    },
    /// The WebUI answered 415: the file is not a valid torrent.
    InvalidTorrent {
        /// Final path component of the uploaded file.
        file_name: String,
    },
    /// The WebUI answered with another non-200 status.
    Rejected {
        /// Final path component of the uploaded file.
        file_name: String,
        /// HTTP status code.
        status: u16,
    },
    /// The upload request itself failed.
    Failed {
        /// Final path component of the uploaded file.
        file_name: String,
        /// Transport error description.
        reason: String,
    },
}

impl FileOutcome {
    /// Whether the file was added.
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added { .. })
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { file_name } => write!(f, "Successfully added torrent file: {file_name}"),
            Self::Missing { path } => write!(f, "File does not exist: {path}"),
            Self::Unreadable { path, reason } => write!(f, "Error reading file {path}: {reason}"),
            Self::InvalidTorrent { file_name } => write!(f, "Invalid torrent file: {file_name}"),
            Self::Rejected { file_name, status } => {
                write!(f, "Failed to add torrent file {file_name}: status code {status}")
            }
            Self::Failed { file_name, reason } => {
                write!(f, "Failed to add torrent file {file_name}: {reason}")
            }
        }
    }
}

/// Ordered per-file outcomes of an `add torrent` batch. Displays one line per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Outcomes in input order.
    pub outcomes: Vec<FileOutcome>,
}

impl AddReport {
    /// Whether at least one file was added.
    pub fn any_added(&self) -> bool {
        self.outcomes.iter().any(FileOutcome::is_added)
    }
}

impl fmt::Display for AddReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

/// Tracker URLs of a torrent, pseudo-trackers removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerReport {
    /// Number of rows the WebUI returned, pseudo-trackers included.
    pub total: usize,
    /// Real announce URLs, in WebUI order.
    pub urls: Vec<String>,
}

impl From<Vec<Tracker>> for TrackerReport {
    fn from(trackers: Vec<Tracker>) -> Self {
        let total = trackers.len();
        let urls = trackers
            .into_iter()
            .filter(|t| !t.is_pseudo())
            .map(|t| t.url)
            .collect();
        Self { total, urls }
    }
}

impl fmt::Display for TrackerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            f.write_str("This torrent has no trackers")
        } else if self.urls.is_empty() {
            f.write_str("This torrent has no valid tracker URLs")
        } else {
            f.write_str(&self.urls.join(","))
        }
    }
}
