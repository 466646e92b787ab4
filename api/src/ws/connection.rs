//! WebSocket connection state management.
//!
//! A [`Connection`] pairs a client's outbound queue with its session state.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex, MutexGuard};
use tracing::debug;

use super::messages::ServerMessage;
use super::session::ClientSession;

/// Global connection ID counter.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a unique connection ID.
#[must_use]
pub fn next_connection_id() -> u64 {
    CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A live client connection.
#[derive(Debug)]
pub struct Connection {
    /// Unique connection ID.
    id: u64,

    /// Sender for outgoing messages, drained by the socket writer task.
    sender: mpsc::Sender<ServerMessage>,

    /// Subscription and tracking state.
    session: Mutex<ClientSession>,
}

impl Connection {
    /// Creates a new connection with an empty session.
    #[must_use]
    pub fn new(sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: next_connection_id(),
            sender,
            session: Mutex::new(ClientSession::new()),
        }
    }

    /// Returns the connection ID.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns true while the socket writer is still running.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Locks the session state.
    pub async fn session(&self) -> MutexGuard<'_, ClientSession> {
        self.session.lock().await
    }

    /// Queues a message for this connection without waiting.
    ///
    /// Returns true if the message was queued. A full queue or a closed
    /// connection drops the message.
    pub fn send(&self, message: ServerMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Outbound queue full for connection {}, dropping message", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}
