//! Model Context Protocol client over streamable HTTP.
//!
//! Every JSON-RPC message is a POST to the server URL. The server may answer
//! with plain JSON or with a short event stream carrying the response; both
//! are accepted. The session id assigned during `initialize` is echoed on
//! every later request and the session is ended with a DELETE.

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AgentError;
use crate::sse;

const PROTOCOL_VERSION: &str = "2025-03-26";
const SESSION_HEADER: &str = "mcp-session-id";

/// A tool advertised by the MCP server.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: Value,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct ToolList {
    tools: Vec<McpTool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    is_error: bool,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct McpClient {
    client: Client,
    url: String,
    session_id: Option<String>,
    initialized: bool,
    next_id: u64,
}

impl McpClient {
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ermap/0.1 (emergency-dispatch)")
            .build()?;

        Ok(Self {
            client,
            url: url.to_owned(),
            session_id: None,
            initialized: false,
            next_id: 1,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Runs the `initialize` handshake and sends `notifications/initialized`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the server is unreachable, rejects the
    /// handshake, or answers with something other than a JSON-RPC result.
    pub async fn initialize(&mut self) -> Result<(), AgentError> {
        let result = self
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "ermap",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                })),
            )
            .await?;

        let server = result
            .pointer("/serverInfo/name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::info!(
            server,
            session = self.session_id.as_deref().unwrap_or("-"),
            "MCP session initialized"
        );

        self.notify("notifications/initialized").await?;
        self.initialized = true;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AgentError::NotConnected`] before [`initialize`](Self::initialize),
    /// or any transport/JSON-RPC error from the server.
    pub async fn list_tools(&mut self) -> Result<Vec<McpTool>, AgentError> {
        self.ensure_initialized()?;
        let result = self.request("tools/list", None).await?;
        let list: ToolList = serde_json::from_value(result).map_err(|e| AgentError::Deserialize {
            context: "tools/list result".to_string(),
            source: e,
        })?;
        Ok(list.tools)
    }

    /// Calls `name` and returns the text content of its result.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Protocol`] when the tool reports `isError`, plus
    /// the errors of [`list_tools`](Self::list_tools).
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String, AgentError> {
        self.ensure_initialized()?;
        let result = self
            .request(
                "tools/call",
                Some(json!({ "name": name, "arguments": arguments })),
            )
            .await?;
        let call: ToolCallResult =
            serde_json::from_value(result).map_err(|e| AgentError::Deserialize {
                context: format!("tools/call({name}) result"),
                source: e,
            })?;

        let text = call
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if call.is_error {
            return Err(AgentError::Protocol(format!("tool '{name}' failed: {text}")));
        }
        Ok(text)
    }

    /// Ends the session. Safe to call repeatedly; failures are logged only.
    pub async fn close(&mut self) {
        self.initialized = false;
        let Some(session_id) = self.session_id.take() else {
            return;
        };
        match self
            .client
            .delete(&self.url)
            .header(SESSION_HEADER, &session_id)
            .send()
            .await
        {
            Ok(response) => {
                tracing::debug!(status = %response.status(), "MCP session closed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to close MCP session");
            }
        }
    }

    fn ensure_initialized(&self) -> Result<(), AgentError> {
        if self.initialized {
            Ok(())
        } else {
            Err(AgentError::NotConnected)
        }
    }

    async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value, AgentError> {
        let id = self.next_id;
        self.next_id += 1;

        let response = self
            .post(&RpcRequest {
                jsonrpc: "2.0",
                id: Some(id),
                method,
                params,
            })
            .await?;

        if let Some(session) = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            self.session_id = Some(session.to_owned());
        }

        let streamed = sse::is_event_stream(&response);
        let body = response.text().await?;
        let reply = if streamed {
            sse::data_events(&body)
                .iter()
                .filter_map(|data| serde_json::from_str::<RpcResponse>(data).ok())
                .find(|r| r.id.as_ref().and_then(Value::as_u64) == Some(id))
                .ok_or_else(|| {
                    AgentError::Protocol(format!("no response to {method} in event stream"))
                })?
        } else {
            serde_json::from_str::<RpcResponse>(&body).map_err(|e| AgentError::Deserialize {
                context: format!("{method} response"),
                source: e,
            })?
        };

        if let Some(err) = reply.error {
            return Err(AgentError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        reply
            .result
            .ok_or_else(|| AgentError::Protocol(format!("{method} response has no result")))
    }

    async fn notify(&mut self, method: &str) -> Result<(), AgentError> {
        self.post(&RpcRequest {
            jsonrpc: "2.0",
            id: None,
            method,
            params: None,
        })
        .await?;
        Ok(())
    }

    async fn post(&self, message: &RpcRequest<'_>) -> Result<Response, AgentError> {
        let mut request = self
            .client
            .post(&self.url)
            .header(
                ACCEPT,
                HeaderValue::from_static("application/json, text/event-stream"),
            )
            .json(message);
        if let Some(session) = &self.session_id {
            request = request.header(SESSION_HEADER, session);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                service: "MCP server",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
