//! Change notifications published by upstream producers.

use std::sync::Arc;

use crate::types::{Block, Mempool, Statistic, Transaction};

/// A change in upstream state that connected clients may care about.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    /// A new live-chart statistic was recorded.
    Statistic(Statistic),

    /// The mempool changed.
    MempoolChange {
        /// Full mempool snapshot after the change.
        mempool: Arc<Mempool>,
        /// Transactions that entered the mempool in this change.
        new_transactions: Vec<Transaction>,
    },

    /// A new block was accepted.
    NewBlock {
        /// The block.
        block: Block,
        /// Ids of the transactions it confirms.
        txids: Vec<String>,
        /// Transactions of the block, where upstream has them.
        transactions: Vec<Transaction>,
    },
}

impl ChainEvent {
    /// Returns the event kind as a string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Statistic(_) => "statistic",
            Self::MempoolChange { .. } => "mempool-change",
            Self::NewBlock { .. } => "new-block",
        }
    }
}
