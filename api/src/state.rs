//! Application state shared by every connection.

use std::sync::Arc;

use mempulse_chain::ChainState;
use tokio::sync::RwLock;

use crate::config::ServerConfig;

/// State shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream snapshots.
    pub chain: Arc<RwLock<ChainState>>,

    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Build identifier, empty when unavailable.
    pub git_commit: Arc<str>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default(), ChainState::new(), String::new())
    }
}

impl AppState {
    /// Creates the application state.
    #[must_use]
    pub fn new(config: ServerConfig, chain: ChainState, git_commit: String) -> Self {
        Self {
            chain: Arc::new(RwLock::new(chain)),
            config: Arc::new(config),
            git_commit: git_commit.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_default() {
        let state = AppState::default();
        assert!(state.git_commit.is_empty());
        assert_eq!(state.config.initial_block_amount, 8);
        assert!(state.chain.read().await.block_history().is_empty());
    }

    #[tokio::test]
    async fn test_app_state_clones_share_chain() {
        let state = AppState::default();
        let clone = state.clone();

        clone.chain.write().await.set_fiat_tick("BTCUSD", 1.0);

        assert_eq!(state.chain.read().await.fiat_tick("BTCUSD"), Some(1.0));
    }
}
