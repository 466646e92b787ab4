//! Mempulse - Real-time WebSocket push layer for blockchain and mempool
//! monitoring.
//!
//! - [`chain`]: Block, transaction and mempool snapshots fed by upstream
//! - [`api`]: WebSocket server, client sessions and broadcast dispatcher

pub use mempulse_api as api;
pub use mempulse_chain as chain;
