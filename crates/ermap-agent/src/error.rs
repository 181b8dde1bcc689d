use thiserror::Error;

use ermap_distance::OracleError;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx reply from the chat or MCP endpoint.
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON-RPC error object returned by the MCP server.
    #[error("MCP error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("MCP session is not initialized")]
    NotConnected,

    #[error("model kept calling tools after {0} rounds")]
    ToolLoop(usize),

    #[error("chat completion contained no content")]
    EmptyCompletion,

    #[error(transparent)]
    Config(#[from] ermap_core::ConfigError),
}

impl From<AgentError> for OracleError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Http(_) | AgentError::Status { .. } => {
                OracleError::Transport(err.to_string())
            }
            AgentError::NotConnected => OracleError::NotConnected,
            other => OracleError::Protocol(other.to_string()),
        }
    }
}
