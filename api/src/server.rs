//! HTTP server.
//!
//! Serves the WebSocket endpoint and the health check, and runs the
//! dispatcher on the upstream event feed.

use axum::routing::get;
use axum::Router;
use mempulse_chain::ChainEvent;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::health::health;
use crate::state::AppState;
use crate::ws::{ws_handler, WsState};

/// Builds the router.
pub fn router(state: WsState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// The push server.
pub struct Server {
    /// Configuration.
    config: ServerConfig,

    /// Shared WebSocket state.
    state: WsState,

    /// Handle given to upstream producers.
    events_tx: mpsc::Sender<ChainEvent>,

    /// Feed consumed by the dispatcher.
    events_rx: mpsc::Receiver<ChainEvent>,
}

impl Server {
    /// Creates a new server.
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.chain_event_buffer);
        Self {
            config,
            state: WsState::new(state),
            events_tx,
            events_rx,
        }
    }

    /// Returns a sender upstream producers publish chain events on.
    #[must_use]
    pub fn events(&self) -> mpsc::Sender<ChainEvent> {
        self.events_tx.clone()
    }

    /// Returns the shared WebSocket state.
    #[must_use]
    pub const fn ws_state(&self) -> &WsState {
        &self.state
    }

    /// Runs the server until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(self) -> Result<(), ApiError> {
        let dispatcher = self.state.dispatcher()?;
        let events_rx = self.events_rx;
        let dispatcher_task = tokio::spawn(async move { dispatcher.run(events_rx).await });

        let listener = TcpListener::bind(self.config.bind_address()).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        drop(self.events_tx);
        dispatcher_task.abort();
        info!("Server stopped");
        Ok(())
    }
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = WsState::new(AppState::new(
            ServerConfig::default(),
            mempulse_chain::ChainState::new(),
            "abc123".to_string(),
        ));
        state.metrics.record_connection_opened();

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["status"], "ok");
        assert_eq!(json["git_commit"], "abc123");
        assert_eq!(json["clients"], 0);
        assert_eq!(json["metrics"]["connections_opened"], 1);
    }

    #[tokio::test]
    async fn test_ws_route_requires_upgrade() {
        let response = router(WsState::new(AppState::default()))
            .oneshot(
                Request::builder()
                    .uri("/ws")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_server_events_reach_dispatcher() {
        let server = Server::new(ServerConfig::default(), AppState::default());
        let events = server.events();
        assert!(!events.is_closed());
        assert!(server.ws_state().dispatcher().is_ok());
    }
}
