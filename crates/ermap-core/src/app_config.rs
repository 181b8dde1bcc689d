use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub warehouses_path: PathBuf,
    /// Base URL of the OpenAI-compatible chat completion endpoint.
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    /// Endpoint of the map tool server (MCP over HTTP).
    pub mcp_url: Option<String>,
    pub request_timeout_secs: u64,
    /// Total attempts per distance pair, including the first.
    pub oracle_max_retries: u32,
    /// Fixed pause between attempts on the same pair.
    pub oracle_backoff_ms: u64,
    /// Overall budget for one resolution run; `0` disables the deadline.
    pub oracle_deadline_secs: u64,
}

impl AppConfig {
    /// Returns the LLM API key or a [`crate::ConfigError::MissingEnvVar`].
    ///
    /// # Errors
    ///
    /// Fails when `ERMAP_LLM_API_KEY` was not set.
    pub fn require_llm_api_key(&self) -> Result<&str, crate::ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("ERMAP_LLM_API_KEY".to_string()))
    }

    /// Returns the map tool server URL or a [`crate::ConfigError::MissingEnvVar`].
    ///
    /// # Errors
    ///
    /// Fails when `ERMAP_MCP_URL` was not set.
    pub fn require_mcp_url(&self) -> Result<&str, crate::ConfigError> {
        self.mcp_url
            .as_deref()
            .ok_or_else(|| crate::ConfigError::MissingEnvVar("ERMAP_MCP_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("warehouses_path", &self.warehouses_path)
            .field("llm_api_base", &self.llm_api_base)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("mcp_url", &self.mcp_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("oracle_max_retries", &self.oracle_max_retries)
            .field("oracle_backoff_ms", &self.oracle_backoff_ms)
            .field("oracle_deadline_secs", &self.oracle_deadline_secs)
            .finish()
    }
}
