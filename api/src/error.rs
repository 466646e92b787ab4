//! API error types.

use crate::config::ConfigError;

/// Errors raised by the push server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// An inbound control message could not be parsed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The dispatcher was built without one of its collaborators.
    #[error("dispatcher is not attached to a {0}")]
    NotAttached(&'static str),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listener or transport failure.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidMessage(err.to_string())
    }
}
