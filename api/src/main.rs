//! Mempulse API Server binary.
//!
//! Entry point for the WebSocket push server.

use mempulse_api::{read_git_commit, AppState, Server, ServerConfig};
use mempulse_chain::ChainState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mempulse_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env()?;
    let git_commit = read_git_commit(&config.git_commit_file);
    let state = AppState::new(config.clone(), ChainState::new(), git_commit);

    tracing::info!(
        "Starting Mempulse API server on {}:{}",
        config.host,
        config.port
    );

    // No in-process producer here. Embedders take `Server::events` before
    // `run` and publish chain events on it.
    let server = Server::new(config, state);
    server.run().await?;

    Ok(())
}
