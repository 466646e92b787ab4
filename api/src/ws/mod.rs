//! WebSocket module for real-time updates.
//!
//! Keeps one session per connected client and pushes each client only the
//! parts of upstream changes it asked for.
//!
//! # Inbound fields
//!
//! - `action`: `want`, `init` or `ping`
//! - `data`: topic list for `want`: `blocks`, `mempool-blocks`,
//!   `live-2h-chart`, `stats`
//! - `track-tx` / `watch-mempool`: follow one transaction
//! - `track-address`: follow one address
//!
//! # Outbound messages
//!
//! - init snapshot, ping/tx reply
//! - statistic, mempool-change and new-block broadcasts from [`Dispatcher`]

pub mod connection;
pub mod dispatcher;
pub mod handler;
pub mod messages;
pub mod metrics;
pub mod registry;
pub mod session;
pub mod validate;

pub use connection::Connection;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use handler::{ws_handler, WsState};
pub use messages::{Action, ClientMessage, ServerMessage, Topic};
pub use metrics::WsMetrics;
pub use registry::ClientRegistry;
pub use session::ClientSession;
