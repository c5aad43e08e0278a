//! Startup configuration.
//!
//! All environment access happens here, once, in `Config::from_env()`.
//! Everything downstream receives explicit structs — no ambient globals.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Completion gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Chat-completions endpoint URL (OpenAI-compatible).
    pub endpoint: String,
    /// Bearer API key.
    pub api_key: SecretString,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-request timeout. A timeout is treated like any other gateway fault.
    pub timeout: Duration,
    /// Retries after the first attempt (0 disables retry).
    pub max_retries: u32,
}

/// Full assistant configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    /// Local database path.
    pub db_path: PathBuf,
    /// Optional directory of prompt templates overriding the built-in pack.
    pub prompt_dir: Option<PathBuf>,
    /// Coach persona name (falls back to the default persona if unknown).
    pub persona: String,
    /// Student name used for plan context and progress rows.
    pub student: Option<String>,
    /// Port for the HTTP front-end.
    pub http_port: u16,
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("MATSIDE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .map_err(|_| ConfigError::MissingEnvVar("MATSIDE_API_KEY".into()))?;

        let endpoint = std::env::var("MATSIDE_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let model = std::env::var("MATSIDE_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let timeout_secs = parse_env_u64("MATSIDE_TIMEOUT_SECS", 60)?;
        let max_retries = parse_env_u64("MATSIDE_MAX_RETRIES", 2)? as u32;
        let http_port = parse_env_u64("MATSIDE_HTTP_PORT", 8080)? as u16;

        Ok(Self {
            gateway: GatewayConfig {
                endpoint,
                api_key: SecretString::from(api_key),
                model,
                timeout: Duration::from_secs(timeout_secs),
                max_retries,
            },
            db_path: std::env::var("MATSIDE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/matside.db")),
            prompt_dir: std::env::var("MATSIDE_PROMPT_DIR").ok().map(PathBuf::from),
            persona: std::env::var("MATSIDE_PERSONA").unwrap_or_else(|_| "james".to_string()),
            student: std::env::var("MATSIDE_STUDENT").ok(),
            http_port,
        })
    }
}

fn parse_env_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected an integer, got {raw:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_u64_defaults_when_unset() {
        assert_eq!(
            parse_env_u64("MATSIDE_TEST_UNSET_VAR_XYZ", 42).unwrap(),
            42
        );
    }
}
