use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_LLM_API_BASE: &str = "https://api-inference.modelscope.cn/v1";
const DEFAULT_LLM_MODEL: &str = "Qwen/Qwen3-235B-A22B";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("ERMAP_ENV", "development"))?;
    let log_level = or_default("ERMAP_LOG_LEVEL", "info");
    let warehouses_path = PathBuf::from(or_default(
        "ERMAP_WAREHOUSES_PATH",
        "./data/warehouses.json",
    ));

    let llm_api_base = or_default("ERMAP_LLM_API_BASE", DEFAULT_LLM_API_BASE)
        .trim_end_matches('/')
        .to_string();
    let llm_api_key = optional("ERMAP_LLM_API_KEY");
    let llm_model = or_default("ERMAP_LLM_MODEL", DEFAULT_LLM_MODEL);
    let mcp_url = optional("ERMAP_MCP_URL");

    let request_timeout_secs = parse_u64("ERMAP_REQUEST_TIMEOUT_SECS", "120")?;
    let oracle_max_retries = parse_u32("ERMAP_ORACLE_MAX_RETRIES", "3")?;
    if oracle_max_retries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ERMAP_ORACLE_MAX_RETRIES".to_string(),
            reason: "must allow at least one attempt".to_string(),
        });
    }
    let oracle_backoff_ms = parse_u64("ERMAP_ORACLE_BACKOFF_MS", "1000")?;
    let oracle_deadline_secs = parse_u64("ERMAP_ORACLE_DEADLINE_SECS", "0")?;

    Ok(AppConfig {
        env,
        log_level,
        warehouses_path,
        llm_api_base,
        llm_api_key,
        llm_model,
        mcp_url,
        request_timeout_secs,
        oracle_max_retries,
        oracle_backoff_ms,
        oracle_deadline_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ERMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
