use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config_env::optional_trimmed_env;
use crate::llm::GeminiGatewayConfig;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_HISTORY_PATH: &str = "chat_history.json";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub history_path: PathBuf,
    pub gemini: GeminiGatewayConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_bind_addr =
            optional_trimmed_env("CHAT_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_bind_addr.parse::<SocketAddr>().map_err(|_| {
            ConfigError::InvalidConfiguration(format!(
                "CHAT_BIND_ADDR is not a socket address: {raw_bind_addr}"
            ))
        })?;

        Ok(Self {
            bind_addr,
            history_path: optional_trimmed_env("CHAT_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH)),
            gemini: GeminiGatewayConfig::from_env(),
        })
    }
}

/// Loads `.env` from the working directory if one exists.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::DotEnv(err.to_string())),
    }
}
