//! Server configuration.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use codebreak_engine::{Alphabet, WordLength};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::service::ServiceSettings;
use crate::store::{MatchStore, MemoryStore, SqliteStore, StoreError};

/// Configuration for a match server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// SQLite file. Matches are kept in memory when absent.
    #[serde(default)]
    database_path: Option<String>,

    /// Seconds a player has to move.
    #[serde(default = "default_turn_duration_secs")]
    turn_duration_secs: u64,

    /// Word length for words matches that do not name one.
    #[serde(default)]
    default_word_length: WordLength,

    /// Alphabet for words matches that do not name one.
    #[serde(default)]
    default_alphabet: Alphabet,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3000
}

#[instrument]
fn default_turn_duration_secs() -> u64 {
    120
}

#[instrument]
fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: None,
            turn_duration_secs: default_turn_duration_secs(),
            default_word_length: WordLength::default(),
            default_alphabet: Alphabet::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        if config.turn_duration_secs == 0 {
            return Err(ConfigError::new("turn_duration_secs must be positive"));
        }
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Same config bound to `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Turn timer length.
    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_duration_secs)
    }

    /// Settings for the match service.
    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings::new(
            self.turn_duration(),
            self.default_word_length,
            self.default_alphabet,
        )
    }

    /// Opens the configured store.
    #[instrument(skip(self), fields(database_path = ?self.database_path))]
    pub fn open_store(&self) -> Result<Arc<dyn MatchStore>, StoreError> {
        match &self.database_path {
            Some(path) => Ok(Arc::new(SqliteStore::open(path)?)),
            None => {
                info!("No database configured, matches are kept in memory");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").expect("parses");
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.turn_duration(), Duration::from_secs(120));
    }

    #[test]
    fn fields_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            port = 8080
            database_path = "matches.db"
            turn_duration_secs = 30
            default_word_length = 6
            default_alphabet = "latin"
            "#,
        )
        .expect("parses");
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.database_path().as_deref(), Some("matches.db"));
        assert_eq!(*config.default_word_length(), WordLength::Six);
        assert_eq!(*config.default_alphabet(), Alphabet::Latin);
        assert_eq!(*config.service_settings().turn_duration(), Duration::from_secs(30));
    }

    #[test]
    fn unsupported_word_length_is_refused() {
        assert!(ServerConfig::from_toml("default_word_length = 7").is_err());
    }

    #[test]
    fn zero_turn_duration_is_refused() {
        assert!(ServerConfig::from_toml("turn_duration_secs = 0").is_err());
    }
}
