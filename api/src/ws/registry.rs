//! Registry of live client connections.
//!
//! Membership changes only on connect and disconnect. Broadcasts iterate a
//! snapshot taken under the read lock, so a client joining or leaving never
//! disturbs a broadcast in progress.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::connection::Connection;

/// All live connections, keyed by connection ID.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    /// Map from connection ID to connection.
    clients: RwLock<HashMap<u64, Arc<Connection>>>,
}

impl ClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a connection.
    pub async fn register(&self, connection: Arc<Connection>) {
        let mut clients = self.clients.write().await;
        clients.insert(connection.id(), connection);
    }

    /// Removes a connection, returning it if it was registered.
    pub async fn unregister(&self, connection_id: u64) -> Option<Arc<Connection>> {
        let mut clients = self.clients.write().await;
        clients.remove(&connection_id)
    }

    /// Returns the current connections. The lock is released on return.
    pub async fn snapshot(&self) -> Vec<Arc<Connection>> {
        let clients = self.clients.read().await;
        clients.values().cloned().collect()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Returns true if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection() -> Arc<Connection> {
        let (tx, _rx) = mpsc::channel(10);
        Arc::new(Connection::new(tx))
    }

    #[tokio::test]
    async fn test_registry_register() {
        let registry = ClientRegistry::new();
        let conn1 = make_connection();
        let conn2 = make_connection();

        registry.register(Arc::clone(&conn1)).await;
        registry.register(Arc::clone(&conn2)).await;

        assert_eq!(registry.len().await, 2);
        let mut ids: Vec<u64> = registry.snapshot().await.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        let mut expected = vec![conn1.id(), conn2.id()];
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_registry_unregister() {
        let registry = ClientRegistry::new();
        let conn = make_connection();
        registry.register(Arc::clone(&conn)).await;

        let removed = registry.unregister(conn.id()).await;

        assert!(removed.is_some());
        assert!(registry.is_empty().await);
        assert!(registry.unregister(conn.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_registry_snapshot_outlives_membership_change() {
        let registry = ClientRegistry::new();
        let conn1 = make_connection();
        let conn2 = make_connection();
        registry.register(Arc::clone(&conn1)).await;
        registry.register(Arc::clone(&conn2)).await;

        let snapshot = registry.snapshot().await;
        registry.unregister(conn1.id()).await;

        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 1);
    }
}
