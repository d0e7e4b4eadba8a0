//! Server settings read from the environment (and `.env`, loaded by `main`).

use std::{net::SocketAddr, time::Duration};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "sqlite://discipline.sqlite";
const DEFAULT_NOTES_DEBOUNCE_MS: u64 = 1000;
const DEFAULT_QUOTE_LANGUAGE: &str = "English";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("invalid listen address {0:?}")]
    InvalidAddress(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub notes_debounce: Duration,
    /// Unset means AI features answer with a generation failure.
    pub anthropic_api_key: Option<SecretString>,
    pub anthropic_model: Option<String>,
    pub quote_language: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let debounce_ms = match get("NOTES_DEBOUNCE_MS") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "NOTES_DEBOUNCE_MS",
                    value,
                })?,
            None => DEFAULT_NOTES_DEBOUNCE_MS,
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            notes_debounce: Duration::from_millis(debounce_ms),
            anthropic_api_key: get("ANTHROPIC_API_KEY").map(SecretString::from),
            anthropic_model: get("ANTHROPIC_MODEL"),
            quote_language: get("QUOTE_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_QUOTE_LANGUAGE.to_string()),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}
