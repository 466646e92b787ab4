//! Server configuration.
//!
//! Provides configuration options for the push server, loaded from the
//! environment with defaults for everything.

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Configuration for the push server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Number of recent blocks sent in the `init` reply.
    pub initial_block_amount: usize,

    /// Fiat pair reported under `conversions`.
    pub fiat_pair: String,

    /// File holding the build identifier (a git ref file).
    pub git_commit_file: PathBuf,

    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,

    /// Capacity of the upstream chain event queue.
    pub chain_event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8999,
            initial_block_amount: 8,
            fiat_pair: "BTCUSD".to_string(),
            git_commit_file: PathBuf::from(".git/refs/heads/master"),
            outbound_buffer: 100,
            chain_event_buffer: 256,
        }
    }
}

impl ServerConfig {
    /// Creates a new configuration bound to the given address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Loads the configuration from environment variables.
    ///
    /// Unset variables keep their default value.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self::new(
            env_or("API_HOST", defaults.host)?,
            env_or("API_PORT", defaults.port)?,
        )
        .with_initial_block_amount(env_or("INITIAL_BLOCK_AMOUNT", defaults.initial_block_amount)?)
        .with_fiat_pair(env_or("FIAT_PAIR", defaults.fiat_pair)?)
        .with_git_commit_file(env_or("GIT_COMMIT_FILE", defaults.git_commit_file)?)
        .with_outbound_buffer(env_or("WS_OUTBOUND_BUFFER", defaults.outbound_buffer)?)
        .with_chain_event_buffer(env_or("CHAIN_EVENT_BUFFER", defaults.chain_event_buffer)?);
        config.validate()?;
        Ok(config)
    }

    /// Sets the number of blocks sent in the `init` reply.
    #[must_use]
    pub fn with_initial_block_amount(mut self, amount: usize) -> Self {
        self.initial_block_amount = amount;
        self
    }

    /// Sets the fiat pair.
    #[must_use]
    pub fn with_fiat_pair(mut self, pair: impl Into<String>) -> Self {
        self.fiat_pair = pair.into();
        self
    }

    /// Sets the per-connection outbound queue capacity.
    #[must_use]
    pub fn with_outbound_buffer(mut self, capacity: usize) -> Self {
        self.outbound_buffer = capacity;
        self
    }

    /// Sets the file the build identifier is read from.
    #[must_use]
    pub fn with_git_commit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.git_commit_file = path.into();
        self
    }

    /// Sets the upstream chain event queue capacity.
    #[must_use]
    pub fn with_chain_event_buffer(mut self, capacity: usize) -> Self {
        self.chain_event_buffer = capacity;
        self
    }

    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if self.initial_block_amount == 0 {
            return Err(ConfigError::InvalidBlockAmount);
        }

        if self.fiat_pair.trim().is_empty() {
            return Err(ConfigError::EmptyFiatPair);
        }

        if self.outbound_buffer == 0 || self.chain_event_buffer == 0 {
            return Err(ConfigError::InvalidBufferSize);
        }

        Ok(())
    }
}

/// Reads an environment variable, falling back to `default` when unset.
fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

/// Reads the build identifier from `path`.
///
/// A missing or unreadable file is not fatal: a warning is logged and the
/// identifier degrades to an empty string.
#[must_use]
pub fn read_git_commit(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.trim().to_string(),
        Err(e) => {
            warn!(
                "Could not read build identifier from {}: {}",
                path.display(),
                e
            );
            String::new()
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Port is zero.
    #[error("port must be > 0")]
    InvalidPort,

    /// Initial block amount is zero.
    #[error("initial_block_amount must be > 0")]
    InvalidBlockAmount,

    /// Fiat pair is empty.
    #[error("fiat_pair must not be empty")]
    EmptyFiatPair,

    /// A queue capacity is zero.
    #[error("buffer sizes must be > 0")]
    InvalidBufferSize,

    /// An environment variable could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}
