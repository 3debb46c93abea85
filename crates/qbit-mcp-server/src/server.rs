//! Newline-delimited JSON-RPC over a byte stream pair.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use qbit_mcp_types::TorrentRemote;

use crate::{
    protocol::{CallToolParams, InitializeParams, JsonRpcRequest, JsonRpcResponse, RpcError},
    tools,
};

/// Name announced in `serverInfo`.
pub const SERVER_NAME: &str = "qbittorrent";

/// Protocol version answered when the client does not ask for one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// McpServer answers MCP requests with the tools backed by `remote`.
///
/// Requests are handled one at a time, in arrival order.
#[derive(Debug)]
pub struct McpServer<R> {
    remote: R,
}

impl<R: TorrentRemote> McpServer<R> {
    /// Create a server over `remote`.
    pub fn new(remote: R) -> Self {
        Self { remote }
    }

    /// Reads requests from `input` until it closes, writing one response line per request.
    pub async fn serve<I, O>(&self, input: I, mut output: O) -> std::io::Result<()>
    where
        I: AsyncRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        // Lines are read as raw bytes; one that is not UTF-8 is answered as a parse error.
        let mut reader = BufReader::new(input);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let Some(response) = self.handle_message(&line).await else {
                continue;
            };

            let mut encoded = serde_json::to_string(&response).map_err(std::io::Error::other)?;
            encoded.push('\n');
            output.write_all(encoded.as_bytes()).await?;
            output.flush().await?;
        }

        info!("Input closed, stopping");
        Ok(())
    }

    /// Handles one message. Notifications yield no response.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        self.handle_message(line.as_bytes()).await
    }

    async fn handle_message(&self, message: &[u8]) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(message) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unparseable message: {e}");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    RpcError::parse_error(e.to_string()),
                ));
            }
        };

        let mut request: JsonRpcRequest = match serde_json::from_value(value.clone()) {
            Ok(request) => request,
            Err(e) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                return Some(JsonRpcResponse::failure(
                    id,
                    RpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.is_notification() {
            debug!("Notification {}", request.method);
            return None;
        }
        let id = request.id.take().unwrap_or_default();

        if request.jsonrpc != crate::protocol::JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                RpcError::invalid_request(format!(
                    "unsupported jsonrpc version {}",
                    request.jsonrpc
                )),
            ));
        }

        debug!("Request {id} {}", request.method);
        Some(match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    async fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        match method {
            "initialize" => {
                let params: InitializeParams = params_or_default(params)?;
                let version = params
                    .protocol_version
                    .unwrap_or_else(|| DEFAULT_PROTOCOL_VERSION.to_string());
                info!("Client initialized with protocol {version}");
                Ok(json!({
                    "protocolVersion": version,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }))
            }
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::descriptors() })),
            "tools/call" => {
                let params: CallToolParams = serde_json::from_value(params)
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                let output = tools::call_tool(&self.remote, &params.name, params.arguments)
                    .await
                    .map_err(|e| RpcError::invalid_params(e.to_string()))?;
                serde_json::to_value(output).map_err(|e| RpcError::invalid_params(e.to_string()))
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }
}

fn params_or_default<T: DeserializeOwned + Default>(params: Value) -> Result<T, RpcError> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| RpcError::invalid_params(e.to_string()))
}
