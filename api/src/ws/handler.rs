//! WebSocket connection handler.
//!
//! Provides the upgrade handler, the per-connection loop and the processing
//! of inbound control messages.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use mempulse_chain::ChainState;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::connection::Connection;
use super::dispatcher::Dispatcher;
use super::messages::{Action, ClientMessage, ServerMessage};
use super::metrics::WsMetrics;
use super::registry::ClientRegistry;
use crate::error::ApiError;
use crate::state::AppState;

/// WebSocket state shared across connections.
#[derive(Debug, Clone)]
pub struct WsState {
    /// Live connections.
    pub registry: Arc<ClientRegistry>,
    /// Metrics.
    pub metrics: Arc<WsMetrics>,
    /// Application state.
    pub app_state: AppState,
}

impl WsState {
    /// Creates a new WebSocket state.
    #[must_use]
    pub fn new(app_state: AppState) -> Self {
        Self {
            registry: Arc::new(ClientRegistry::new()),
            metrics: Arc::new(WsMetrics::new()),
            app_state,
        }
    }

    /// Builds a dispatcher attached to this state's registry and chain.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAttached`] if a collaborator is missing.
    pub fn dispatcher(&self) -> Result<Dispatcher, ApiError> {
        Dispatcher::builder()
            .registry(Arc::clone(&self.registry))
            .chain(Arc::clone(&self.app_state.chain))
            .metrics(Arc::clone(&self.metrics))
            .build()
    }
}

/// WebSocket upgrade handler.
///
/// Upgrades an HTTP connection to a WebSocket connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_connection(socket, state))
}

/// Handles a WebSocket connection.
async fn handle_connection(socket: WebSocket, state: WsState) {
    state.metrics.record_connection_opened();

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(state.app_state.config.outbound_buffer);

    let connection = Arc::new(Connection::new(tx));
    let connection_id = connection.id();
    state.registry.register(Arc::clone(&connection)).await;
    info!("WebSocket connection {} opened", connection_id);

    // Spawn task to forward messages from channel to WebSocket
    let metrics = Arc::clone(&state.metrics);
    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics.record_message_sent();
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        let msg = match result {
            Ok(msg) => msg,
            Err(e) => {
                warn!("WebSocket error on connection {}: {}", connection_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                state.metrics.record_message_received();
                if let Err(e) = handle_text_message(text.as_str(), &connection, &state).await {
                    warn!("Dropping message from connection {}: {}", connection_id, e);
                    state.metrics.record_invalid_message();
                }
            }
            // Pong frames are written by the transport itself.
            Message::Ping(_) => {
                debug!("Received ping");
            }
            Message::Pong(_) => {
                debug!("Received pong");
            }
            Message::Binary(_) => {
                debug!("Ignoring binary frame on connection {}", connection_id);
            }
            Message::Close(_) => {
                info!("WebSocket close requested");
                break;
            }
        }
    }

    // Cleanup
    state.registry.unregister(connection_id).await;
    state.metrics.record_connection_closed();
    sender_task.abort();

    info!("WebSocket connection {} closed", connection_id);
}

/// Handles a text message from the client.
///
/// Every field present in the message is applied in a fixed order. The
/// `init` snapshot is sent on its own; `tx` and `pong` are collected into a
/// single reply sent afterwards.
///
/// # Errors
///
/// Returns an error if the text is not a JSON object. The connection is
/// left untouched and nothing is sent.
pub async fn handle_text_message(
    text: &str,
    connection: &Connection,
    state: &WsState,
) -> Result<(), ApiError> {
    let message = ClientMessage::parse(text)?;
    let action = message.action();
    let mut reply = ServerMessage::default();

    {
        let chain = state.app_state.chain.read().await;
        let mut session = connection.session().await;

        if action == Some(Action::Want) {
            if let Some(topics) = message.topics() {
                debug!("Connection {} wants {:?}", connection.id(), topics);
                session.update_wants(topics);
            }
        }

        if let Some(candidate) = message.track_tx() {
            reply.tx = session.set_track_tx(candidate, message.watch_mempool(), chain.mempool());
        }

        if let Some(candidate) = message.track_address() {
            session.set_track_address(candidate);
        }

        if action == Some(Action::Init) {
            if let Some(init) = init_reply(&chain, &state.app_state) {
                reply_to(connection, init, &state.metrics);
            }
        }
    }

    if action == Some(Action::Ping) {
        reply.pong = Some(true);
    }

    if !reply.is_empty() {
        reply_to(connection, reply, &state.metrics);
    }

    Ok(())
}

/// Queues a direct reply, counting it as dropped if it could not be queued.
fn reply_to(connection: &Connection, message: ServerMessage, metrics: &WsMetrics) {
    if !connection.send(message) {
        metrics.record_dropped_message();
    }
}

/// Builds the initial snapshot, or None until block history is available.
fn init_reply(chain: &ChainState, app_state: &AppState) -> Option<ServerMessage> {
    if chain.block_history().is_empty() {
        return None;
    }

    Some(ServerMessage {
        mempool_info: Some(chain.mempool_info().clone()),
        vbytes_per_second: Some(chain.vbytes_per_second()),
        blocks: Some(
            chain
                .recent_blocks(app_state.config.initial_block_amount)
                .to_vec(),
        ),
        conversions: chain.fiat_tick(&app_state.config.fiat_pair),
        mempool_blocks: Some(chain.mempool_blocks().to_vec()),
        git_commit: Some(app_state.git_commit.to_string()),
        ..Default::default()
    })
}
