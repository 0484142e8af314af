//! Process configuration read from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HOST` | `127.0.0.1` | Bind address |
//! | `PORT` | `3000` | Bind port |
//! | `TODO_DATABASE` | unset | Unset: in-memory map. `:memory:` or a path: SQLite |
//! | `TODO_EXPOSE_ERROR_DETAILS` | `false` | Include fault messages in 500 bodies |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//!
//! `RUST_LOG` is read separately by `telemetry::init`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{MemoryStore, SqliteStore, StoreError, TodoStore};
use crate::telemetry::LogFormat;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid port")]
    InvalidPort { var: &'static str, value: String },

    #[error("{var}={value:?} is not a boolean (expected true/false/1/0)")]
    InvalidBool { var: &'static str, value: String },

    #[error("LOG_FORMAT={0:?} is not supported (expected text or json)")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    SqliteInMemory,
    SqliteFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub expose_error_details: bool,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            storage: StorageBackend::Memory,
            expose_error_details: false,
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            None => defaults.port,
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort { var: "PORT", value })?,
        };

        let storage = match get("TODO_DATABASE") {
            None => StorageBackend::Memory,
            Some(value) if value == ":memory:" => StorageBackend::SqliteInMemory,
            Some(path) => StorageBackend::SqliteFile(PathBuf::from(path)),
        };

        let expose_error_details = match get("TODO_EXPOSE_ERROR_DETAILS") {
            None => defaults.expose_error_details,
            Some(value) => parse_bool("TODO_EXPOSE_ERROR_DETAILS", value)?,
        };

        let log_format = match get("LOG_FORMAT") {
            None => defaults.log_format,
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                _ => return Err(ConfigError::InvalidLogFormat(value)),
            },
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            storage,
            expose_error_details,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn open_store(&self) -> Result<Arc<dyn TodoStore>, StoreError> {
        Ok(match &self.storage {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::SqliteInMemory => Arc::new(SqliteStore::open_in_memory()?),
            StorageBackend::SqliteFile(path) => Arc::new(SqliteStore::open(path)?),
        })
    }
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}
