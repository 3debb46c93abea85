//! The qBittorrent tool set: descriptors, argument decoding and result rendering.

use std::{convert::Infallible, fmt};

use serde::{
    Deserialize, Deserializer,
    de::{self, DeserializeOwned},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use qbit_mcp_types::{HashSelector, QbitError, TorrentRemote, TorrentSource};

use crate::protocol::{ToolDescriptor, ToolOutput};

/// Error variants for [`call_tool`]. Both map to JSON-RPC invalid params.
#[derive(Error, Debug)]
pub enum ToolCallError {
    /// No tool has this name.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments do not match the tool's input schema.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Decoder message.
        reason: String,
    },
}

/// Descriptors of every tool, in listing order.
pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "add_torrent",
            description: "Add torrent files to qBittorrent. `query` is either a JSON object \
                {\"file_paths\": [\"a.torrent\", \"b.torrent\"]}, a JSON array \
                [\"a.torrent\", \"b.torrent\"], or a single file path.",
            input_schema: object_schema(
                json!({ "query": string_schema("Torrent file path(s)") }),
                &["query"],
            ),
        },
        ToolDescriptor {
            name: "delete_torrent",
            description: "Delete torrents from qBittorrent.",
            input_schema: object_schema(
                json!({
                    "hashes": string_schema(HASHES_HELP),
                    "delete_files": {
                        "type": "boolean",
                        "description": "Also delete downloaded files",
                        "default": false
                    }
                }),
                &["hashes"],
            ),
        },
        ToolDescriptor {
            name: "pause_torrent",
            description: "Pause torrents.",
            input_schema: object_schema(
                json!({ "hashes": string_schema(HASHES_HELP) }),
                &["hashes"],
            ),
        },
        ToolDescriptor {
            name: "resume_torrent",
            description: "Resume paused torrents.",
            input_schema: object_schema(
                json!({ "hashes": string_schema(HASHES_HELP) }),
                &["hashes"],
            ),
        },
        ToolDescriptor {
            name: "get_torrent_trackers",
            description: "Get the tracker URLs of a torrent. \
                DHT, PeX and LSD entries are left out.",
            input_schema: object_schema(
                json!({ "hash": string_schema("Torrent hash") }),
                &["hash"],
            ),
        },
        ToolDescriptor {
            name: "set_global_download_limit",
            description: "Set the global download speed limit.",
            input_schema: object_schema(json!({ "limit": limit_schema() }), &["limit"]),
        },
        ToolDescriptor {
            name: "set_global_upload_limit",
            description: "Set the global upload speed limit.",
            input_schema: object_schema(json!({ "limit": limit_schema() }), &["limit"]),
        },
        ToolDescriptor {
            name: "get_application_version",
            description: "Get the qBittorrent application version.",
            input_schema: object_schema(json!({}), &[]),
        },
        ToolDescriptor {
            name: "set_file_priority",
            description: "Set the download priority of files inside a torrent. \
                Priorities: 0 do not download, 1 normal, 6 high, 7 maximal.",
            input_schema: object_schema(
                json!({
                    "hash": string_schema("Torrent hash"),
                    "id": {
                        "type": ["string", "integer"],
                        "description": "File index in the torrent contents list \
                            (0 for the first file), several indexes separated by |"
                    },
                    "priority": { "type": "integer", "enum": [0, 1, 6, 7] }
                }),
                &["hash", "id", "priority"],
            ),
        },
        ToolDescriptor {
            name: "set_torrent_download_limit",
            description: "Set the download speed limit of a torrent.",
            input_schema: object_schema(
                json!({ "hash": string_schema("Torrent hash"), "limit": limit_schema() }),
                &["hash", "limit"],
            ),
        },
        ToolDescriptor {
            name: "set_torrent_upload_limit",
            description: "Set the upload speed limit of a torrent.",
            input_schema: object_schema(
                json!({ "hash": string_schema("Torrent hash"), "limit": limit_schema() }),
                &["hash", "limit"],
            ),
        },
        ToolDescriptor {
            name: "add_trackers_to_torrent",
            description: "Add tracker URLs to a torrent.",
            input_schema: object_schema(
                json!({
                    "hash": string_schema("Torrent hash"),
                    "trackers": list_schema(
                        "Tracker URLs, as a list or one string separated by %0A"
                    )
                }),
                &["hash", "trackers"],
            ),
        },
        ToolDescriptor {
            name: "add_torrent_tags",
            description: "Add tags to a torrent.",
            input_schema: object_schema(
                json!({
                    "hash": string_schema("Torrent hash"),
                    "tags": list_schema("Tags, as a list or one comma separated string")
                }),
                &["hash", "tags"],
            ),
        },
        ToolDescriptor {
            name: "get_torrent_list",
            description: "List all torrents as JSON.",
            input_schema: object_schema(json!({}), &[]),
        },
    ]
}

const HASHES_HELP: &str = "Torrent hashes separated by |, or `all`";

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn string_schema(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn limit_schema() -> Value {
    json!({ "type": "integer", "description": "Speed limit in bytes/second, 0 for unlimited" })
}

fn list_schema(description: &str) -> Value {
    json!({
        "description": description,
        "anyOf": [
            { "type": "string" },
            { "type": "array", "items": { "type": "string" } }
        ]
    })
}

#[derive(Debug, Deserialize)]
struct AddTorrentArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct DeleteArgs {
    hashes: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    delete_files: bool,
}

#[derive(Debug, Deserialize)]
struct HashesArgs {
    hashes: String,
}

#[derive(Debug, Deserialize)]
struct HashArgs {
    hash: String,
}

#[derive(Debug, Deserialize)]
struct LimitArgs {
    #[serde(deserialize_with = "lenient_i64")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct FilePriorityArgs {
    hash: String,
    id: FileIds,
    #[serde(deserialize_with = "lenient_i64")]
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct TorrentLimitArgs {
    hash: String,
    #[serde(deserialize_with = "lenient_i64")]
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct TrackersArgs {
    hash: String,
    trackers: StringOrList,
}

#[derive(Debug, Deserialize)]
struct TagsArgs {
    hash: String,
    tags: StringOrList,
}

#[derive(Debug, Deserialize)]
struct NoArgs {}

/// File ids arrive as `"0|2"` or as a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileIds {
    Number(i64),
    Text(String),
}

impl fmt::Display for FileIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(ids) => f.write_str(ids.trim()),
        }
    }
}

/// Numbers may also arrive quoted, as `"1024"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected an integer, got {text:?}"))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolOrText {
    Bool(bool),
    Text(String),
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match BoolOrText::deserialize(deserializer)? {
        BoolOrText::Bool(flag) => Ok(flag),
        BoolOrText::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(de::Error::custom(format!("expected a boolean, got {text:?}"))),
        },
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Splits a single string on every separator, then trims and drops empty items.
    fn into_items(self, separators: &[&str]) -> Vec<String> {
        let raw = match self {
            Self::Many(items) => items,
            Self::One(text) => {
                let mut parts = vec![text];
                for separator in separators {
                    parts = parts
                        .iter()
                        .flat_map(|part| part.split(separator))
                        .map(str::to_string)
                        .collect();
                }
                parts
            }
        };

        raw.into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolCallError> {
    // Tools without arguments may be called with no arguments object at all.
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn selector(hashes: &str) -> HashSelector {
    hashes.parse().unwrap_or_else(|never: Infallible| match never {})
}

/// Renders a failed operation. `action` completes "Failed to ...".
fn render_error(action: &str, err: &QbitError) -> ToolOutput {
    warn!("Failed to {action}: {err}");
    let text = match err {
        QbitError::LoginFailed => "Login failed, unable to get SID".to_string(),
        QbitError::Status { code, body } if body.is_empty() => {
            format!("Failed to {action}: status code {code}")
        }
        QbitError::Status { code, body } => {
            format!("Failed to {action}: status code {code}, response body: {body}")
        }
        other => format!("Error: {other}"),
    };
    ToolOutput::error(text)
}

fn render(action: &str, result: Result<String, QbitError>) -> ToolOutput {
    match result {
        Ok(text) => ToolOutput::text(text),
        Err(e) => render_error(action, &e),
    }
}

/// Selector-wide success text: `"{verb} all torrents"` or `"{verb} specified torrents: ..."`.
fn selector_message(verb: &str, hashes: &HashSelector) -> String {
    if hashes.is_all() {
        format!("Successfully {verb} all torrents")
    } else {
        format!("Successfully {verb} specified torrents: {hashes}")
    }
}

/// Runs tool `name` against `remote`.
///
/// Operation failures become an error [`ToolOutput`]; only an unknown tool or
/// undecodable arguments are returned as [`ToolCallError`].
pub async fn call_tool<R: TorrentRemote>(
    remote: &R,
    name: &str,
    arguments: Value,
) -> Result<ToolOutput, ToolCallError> {
    debug!("Calling tool {name}");
    let output = match name {
        "add_torrent" => {
            let args: AddTorrentArgs = decode(name, arguments)?;
            add_torrent(remote, &args.query).await
        }
        "delete_torrent" => {
            let args: DeleteArgs = decode(name, arguments)?;
            let hashes = selector(&args.hashes);
            let result = remote.delete(&hashes, args.delete_files).await;
            render(
                "delete torrent",
                result.map(|()| selector_message("deleted", &hashes)),
            )
        }
        "pause_torrent" => {
            let args: HashesArgs = decode(name, arguments)?;
            let hashes = selector(&args.hashes);
            let result = remote.pause(&hashes).await;
            render(
                "pause torrent",
                result.map(|()| selector_message("paused", &hashes)),
            )
        }
        "resume_torrent" => {
            let args: HashesArgs = decode(name, arguments)?;
            let hashes = selector(&args.hashes);
            let result = remote.resume(&hashes).await;
            render(
                "resume torrent",
                result.map(|()| selector_message("resumed", &hashes)),
            )
        }
        "get_torrent_trackers" => {
            let args: HashArgs = decode(name, arguments)?;
            let result = remote.trackers(&args.hash).await;
            render(
                "get torrent trackers",
                result.map(|report| report.to_string()),
            )
        }
        "set_global_download_limit" => {
            let args: LimitArgs = decode(name, arguments)?;
            let result = remote.set_global_download_limit(args.limit).await;
            render(
                "set speed limit",
                result.map(|()| format!("Successfully set speed limit: {}", args.limit)),
            )
        }
        "set_global_upload_limit" => {
            let args: LimitArgs = decode(name, arguments)?;
            let result = remote.set_global_upload_limit(args.limit).await;
            render(
                "set speed limit",
                result.map(|()| format!("Successfully set speed limit: {}", args.limit)),
            )
        }
        "get_application_version" => {
            let _: NoArgs = decode(name, arguments)?;
            render("get qBittorrent version", remote.version().await)
        }
        "set_file_priority" => {
            let args: FilePriorityArgs = decode(name, arguments)?;
            let ids = args.id.to_string();
            let result = remote
                .set_file_priority(&args.hash, &ids, args.priority)
                .await;
            render(
                "set file priority",
                result.map(|()| {
                    format!(
                        "Successfully set file priority: {}:{}:{}",
                        args.hash, ids, args.priority
                    )
                }),
            )
        }
        "set_torrent_download_limit" => {
            let args: TorrentLimitArgs = decode(name, arguments)?;
            let result = remote
                .set_torrent_download_limit(&selector(&args.hash), args.limit)
                .await;
            render(
                "set torrent download speed limit",
                result.map(|()| {
                    format!(
                        "Successfully set torrent download speed limit: {}:{}",
                        args.hash, args.limit
                    )
                }),
            )
        }
        "set_torrent_upload_limit" => {
            let args: TorrentLimitArgs = decode(name, arguments)?;
            let result = remote
                .set_torrent_upload_limit(&selector(&args.hash), args.limit)
                .await;
            render(
                "set torrent upload speed limit",
                result.map(|()| {
                    format!(
                        "Successfully set torrent upload speed limit: {}:{}",
                        args.hash, args.limit
                    )
                }),
            )
        }
        "add_trackers_to_torrent" => {
            let args: TrackersArgs = decode(name, arguments)?;
            let urls = args.trackers.into_items(&["%0A", "\n"]);
            let result = remote.add_trackers(&args.hash, &urls).await;
            render(
                "add trackers",
                result.map(|()| {
                    format!("Successfully added trackers: {}:{}", args.hash, urls.join(","))
                }),
            )
        }
        "add_torrent_tags" => {
            let args: TagsArgs = decode(name, arguments)?;
            let tags = args.tags.into_items(&[","]);
            let result = remote.add_tags(&selector(&args.hash), &tags).await;
            render(
                "add torrent tags",
                result.map(|()| {
                    format!("Successfully added torrent tags: {}:{}", args.hash, tags.join(","))
                }),
            )
        }
        "get_torrent_list" => {
            let _: NoArgs = decode(name, arguments)?;
            let result = remote.list().await.and_then(|torrents| {
                serde_json::to_string_pretty(&torrents)
                    .map_err(|e| QbitError::Decode(e.to_string()))
            });
            render("get torrent list", result)
        }
        other => return Err(ToolCallError::UnknownTool(other.to_string())),
    };

    Ok(output)
}

async fn add_torrent<R: TorrentRemote>(remote: &R, query: &str) -> ToolOutput {
    // Malformed input is rejected before anything is sent.
    let source: TorrentSource = match query.parse() {
        Ok(source) => source,
        Err(e) => return render_error("add torrent", &e),
    };

    match remote.add(source).await {
        Ok(report) if report.any_added() => ToolOutput::text(report.to_string()),
        Ok(report) => ToolOutput::error(report.to_string()),
        Err(e) => render_error("add torrent", &e),
    }
}
