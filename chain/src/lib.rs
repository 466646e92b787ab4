//! Mempulse Chain - Upstream snapshots consumed by the push layer.
//!
//! Block indexing, mempool maintenance and price polling happen elsewhere.
//! This crate holds the value types those producers publish and an
//! in-memory [`ChainState`] store that the WebSocket layer reads from.
//!
//! # Components
//!
//! - [`types`]: Block, Transaction, MempoolInfo, MempoolBlock, Statistic
//! - [`state`]: Shared snapshot store
//! - [`projection`]: Mempool-to-block projection
//! - [`events`]: Change notifications published by producers

pub mod events;
pub mod projection;
pub mod state;
pub mod types;

pub use events::ChainEvent;
pub use projection::project_mempool_blocks;
pub use state::ChainState;
pub use types::{
    Block, Mempool, MempoolBlock, MempoolInfo, Statistic, Transaction, TxInput, TxOutput, TxStatus,
};
