//! WebSocket metrics tracking.
//!
//! Provides atomic counters for monitoring WebSocket connections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Metrics for the WebSocket server.
#[derive(Debug)]
pub struct WsMetrics {
    /// Total connections opened.
    connections_opened: AtomicU64,

    /// Total connections closed.
    connections_closed: AtomicU64,

    /// Total messages received.
    messages_received: AtomicU64,

    /// Total messages sent.
    messages_sent: AtomicU64,

    /// Inbound messages that could not be parsed.
    invalid_messages: AtomicU64,

    /// Outbound messages dropped because the queue was full or closed.
    dropped_messages: AtomicU64,

    /// Statistic broadcasts delivered.
    statistic_broadcasts: AtomicU64,

    /// Mempool-change broadcasts delivered.
    mempool_broadcasts: AtomicU64,

    /// New-block broadcasts delivered.
    block_broadcasts: AtomicU64,

    /// Start time for rate calculation.
    start_time: Instant,
}

impl Default for WsMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl WsMetrics {
    /// Creates a new metrics instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections_opened: AtomicU64::new(0),
            connections_closed: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_sent: AtomicU64::new(0),
            invalid_messages: AtomicU64::new(0),
            dropped_messages: AtomicU64::new(0),
            statistic_broadcasts: AtomicU64::new(0),
            mempool_broadcasts: AtomicU64::new(0),
            block_broadcasts: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a connection opened.
    pub fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a connection closed.
    pub fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a message received.
    pub fn record_message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a message sent.
    pub fn record_message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an inbound message that was dropped as malformed.
    pub fn record_invalid_message(&self) {
        self.invalid_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an outbound message that could not be queued.
    pub fn record_dropped_message(&self) {
        self.dropped_messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` statistic broadcasts.
    pub fn record_statistic_broadcasts(&self, count: u64) {
        self.statistic_broadcasts.fetch_add(count, Ordering::Relaxed);
    }

    /// Records `count` mempool-change broadcasts.
    pub fn record_mempool_broadcasts(&self, count: u64) {
        self.mempool_broadcasts.fetch_add(count, Ordering::Relaxed);
    }

    /// Records `count` new-block broadcasts.
    pub fn record_block_broadcasts(&self, count: u64) {
        self.block_broadcasts.fetch_add(count, Ordering::Relaxed);
    }

    /// Returns the total connections opened.
    #[must_use]
    pub fn connections_opened(&self) -> u64 {
        self.connections_opened.load(Ordering::Relaxed)
    }

    /// Returns the total connections closed.
    #[must_use]
    pub fn connections_closed(&self) -> u64 {
        self.connections_closed.load(Ordering::Relaxed)
    }

    /// Returns the current active connections.
    #[must_use]
    pub fn active_connections(&self) -> u64 {
        self.connections_opened()
            .saturating_sub(self.connections_closed())
    }

    /// Returns the total messages received.
    #[must_use]
    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }

    /// Returns the total messages sent.
    #[must_use]
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Returns the total malformed inbound messages.
    #[must_use]
    pub fn invalid_messages(&self) -> u64 {
        self.invalid_messages.load(Ordering::Relaxed)
    }

    /// Returns the total dropped outbound messages.
    #[must_use]
    pub fn dropped_messages(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Returns the total statistic broadcasts.
    #[must_use]
    pub fn statistic_broadcasts(&self) -> u64 {
        self.statistic_broadcasts.load(Ordering::Relaxed)
    }

    /// Returns the total mempool-change broadcasts.
    #[must_use]
    pub fn mempool_broadcasts(&self) -> u64 {
        self.mempool_broadcasts.load(Ordering::Relaxed)
    }

    /// Returns the total new-block broadcasts.
    #[must_use]
    pub fn block_broadcasts(&self) -> u64 {
        self.block_broadcasts.load(Ordering::Relaxed)
    }

    /// Returns the uptime.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns messages per second (received + sent).
    #[must_use]
    pub fn messages_per_second(&self) -> f64 {
        let elapsed = self.uptime().as_secs_f64();
        if elapsed > 0.0 {
            (self.messages_received() + self.messages_sent()) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns a snapshot of all metrics.
    #[must_use]
    pub fn snapshot(&self) -> WsMetricsSnapshot {
        WsMetricsSnapshot {
            connections_opened: self.connections_opened(),
            connections_closed: self.connections_closed(),
            active_connections: self.active_connections(),
            messages_received: self.messages_received(),
            messages_sent: self.messages_sent(),
            invalid_messages: self.invalid_messages(),
            dropped_messages: self.dropped_messages(),
            statistic_broadcasts: self.statistic_broadcasts(),
            mempool_broadcasts: self.mempool_broadcasts(),
            block_broadcasts: self.block_broadcasts(),
            uptime_secs: self.uptime().as_secs(),
            messages_per_second: self.messages_per_second(),
        }
    }
}

/// A point-in-time snapshot of WebSocket metrics.
#[derive(Debug, Clone, Serialize)]
pub struct WsMetricsSnapshot {
    /// Total connections opened.
    pub connections_opened: u64,
    /// Total connections closed.
    pub connections_closed: u64,
    /// Active connections.
    pub active_connections: u64,
    /// Messages received.
    pub messages_received: u64,
    /// Messages sent.
    pub messages_sent: u64,
    /// Malformed inbound messages.
    pub invalid_messages: u64,
    /// Dropped outbound messages.
    pub dropped_messages: u64,
    /// Statistic broadcasts.
    pub statistic_broadcasts: u64,
    /// Mempool-change broadcasts.
    pub mempool_broadcasts: u64,
    /// New-block broadcasts.
    pub block_broadcasts: u64,
    /// Uptime in seconds.
    pub uptime_secs: u64,
    /// Messages per second.
    pub messages_per_second: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = WsMetrics::new();
        assert_eq!(metrics.connections_opened(), 0);
        assert_eq!(metrics.connections_closed(), 0);
        assert_eq!(metrics.active_connections(), 0);
    }

    #[test]
    fn test_metrics_record_connection() {
        let metrics = WsMetrics::new();

        metrics.record_connection_opened();
        metrics.record_connection_opened();
        assert_eq!(metrics.connections_opened(), 2);
        assert_eq!(metrics.active_connections(), 2);

        metrics.record_connection_closed();
        assert_eq!(metrics.connections_closed(), 1);
        assert_eq!(metrics.active_connections(), 1);
    }

    #[test]
    fn test_metrics_record_messages() {
        let metrics = WsMetrics::new();

        metrics.record_message_received();
        metrics.record_message_received();
        metrics.record_message_sent();
        metrics.record_invalid_message();
        metrics.record_dropped_message();

        assert_eq!(metrics.messages_received(), 2);
        assert_eq!(metrics.messages_sent(), 1);
        assert_eq!(metrics.invalid_messages(), 1);
        assert_eq!(metrics.dropped_messages(), 1);
    }

    #[test]
    fn test_metrics_record_broadcasts() {
        let metrics = WsMetrics::new();

        metrics.record_statistic_broadcasts(3);
        metrics.record_mempool_broadcasts(2);
        metrics.record_block_broadcasts(1);
        metrics.record_block_broadcasts(4);

        assert_eq!(metrics.statistic_broadcasts(), 3);
        assert_eq!(metrics.mempool_broadcasts(), 2);
        assert_eq!(metrics.block_broadcasts(), 5);
    }

    #[test]
    fn test_metrics_snapshot() {
        let metrics = WsMetrics::new();

        metrics.record_connection_opened();
        metrics.record_message_received();
        metrics.record_message_sent();

        let snapshot = metrics.snapshot();

        assert_eq!(snapshot.connections_opened, 1);
        assert_eq!(snapshot.active_connections, 1);
        assert_eq!(snapshot.messages_received, 1);
        assert_eq!(snapshot.messages_sent, 1);
    }

    #[test]
    fn test_metrics_snapshot_serializes() {
        let snapshot = WsMetrics::new().snapshot();
        let json = serde_json::to_value(&snapshot).expect("serialize");
        assert_eq!(json["active_connections"], 0);
        assert!(json.get("uptime_secs").is_some());
    }
}
