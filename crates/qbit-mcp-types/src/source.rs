//! Interpretation of the free-form `add torrent` input.

use std::str::FromStr;

use serde_json::Value;

use crate::QbitError;

const UNRECOGNIZED_JSON: &str = "Unrecognized JSON format, please provide required format";

/// The accepted shapes of an `add torrent` query.
///
/// Precedence is fixed: input that parses as JSON must be an object carrying
/// `file_paths` or an array; any other JSON value is rejected. Only input that
/// is not JSON at all is taken as a literal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    /// `{"file_paths": ["a.torrent", "b.torrent"]}`
    FilePathsObject(Vec<String>),
    /// `["a.torrent", "b.torrent"]`
    PathArray(Vec<String>),
    /// `a.torrent`, surrounding whitespace removed.
    LiteralPath(String),
}

impl TorrentSource {
    /// The paths to upload, in input order.
    pub fn into_paths(self) -> Vec<String> {
        match self {
            Self::FilePathsObject(paths) | Self::PathArray(paths) => paths,
            Self::LiteralPath(path) => vec![path],
        }
    }
}

impl FromStr for TorrentSource {
    type Err = QbitError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        let value: Value = match serde_json::from_str(query) {
            Ok(value) => value,
            Err(_) => return Ok(Self::LiteralPath(query.trim().to_string())),
        };

        match value {
            Value::Object(mut object) => match object.remove("file_paths") {
                Some(paths) => Ok(Self::FilePathsObject(path_list(paths)?)),
                None => Err(QbitError::InvalidInput(UNRECOGNIZED_JSON.into())),
            },
            value @ Value::Array(_) => Ok(Self::PathArray(path_list(value)?)),
            _ => Err(QbitError::InvalidInput(UNRECOGNIZED_JSON.into())),
        }
    }
}

fn path_list(value: Value) -> Result<Vec<String>, QbitError> {
    let Value::Array(items) = value else {
        return Err(QbitError::InvalidInput(
            "file_paths must be a list of path strings".into(),
        ));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(path) => Ok(path),
            other => Err(QbitError::InvalidInput(format!(
                "torrent file path must be a string, got {other}"
            ))),
        })
        .collect()
}
