//! Shared chain snapshot store.
//!
//! Producers write into a [`ChainState`] behind a `tokio::sync::RwLock`;
//! the push layer reads the snapshots it needs for replies and broadcasts.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::events::ChainEvent;
use crate::projection::project_mempool_blocks;
use crate::types::{Block, Mempool, MempoolBlock, MempoolInfo};

/// Default number of recent blocks kept in memory.
pub const DEFAULT_BLOCK_HISTORY: usize = 64;

/// Latest snapshots published by the upstream producers.
#[derive(Debug)]
pub struct ChainState {
    /// Recent blocks, oldest first.
    blocks: Vec<Block>,

    /// Maximum number of blocks kept.
    history_limit: usize,

    /// Current mempool snapshot.
    mempool: Arc<Mempool>,

    /// Aggregate mempool information.
    mempool_info: MempoolInfo,

    /// Incoming vbytes per second.
    vbytes_per_second: u64,

    /// Last computed projection.
    mempool_blocks: Vec<MempoolBlock>,

    /// Latest fiat prices by pair (e.g. `BTCUSD`).
    tickers: HashMap<String, f64>,
}

impl Default for ChainState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainState {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_BLOCK_HISTORY)
    }

    /// Creates an empty store keeping at most `history_limit` blocks.
    #[must_use]
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            blocks: Vec::new(),
            history_limit: history_limit.max(1),
            mempool: Arc::new(Mempool::new()),
            mempool_info: MempoolInfo::default(),
            vbytes_per_second: 0,
            mempool_blocks: Vec::new(),
            tickers: HashMap::new(),
        }
    }

    /// Appends a newly accepted block, evicting the oldest beyond the limit.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
        if self.blocks.len() > self.history_limit {
            let excess = self.blocks.len() - self.history_limit;
            self.blocks.drain(..excess);
        }
    }

    /// Records the snapshot carried by an upstream event.
    ///
    /// A mempool change replaces the mempool snapshot and a new block joins
    /// the history. Statistics are not stored.
    pub fn apply(&mut self, event: &ChainEvent) {
        match event {
            ChainEvent::Statistic(_) => {}
            ChainEvent::MempoolChange { mempool, .. } => {
                self.set_mempool(Arc::clone(mempool));
                debug!("Mempool snapshot now has {} transactions", mempool.len());
            }
            ChainEvent::NewBlock { block, .. } => {
                self.push_block(block.clone());
                debug!("Block {} appended to history", block.height);
            }
        }
    }

    /// Returns the block history, oldest first. Empty until upstream reports a block.
    #[must_use]
    pub fn block_history(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns up to `count` most recent blocks, oldest first.
    #[must_use]
    pub fn recent_blocks(&self, count: usize) -> &[Block] {
        let start = self.blocks.len().saturating_sub(count);
        self.blocks.get(start..).unwrap_or_default()
    }

    /// Replaces the mempool snapshot.
    pub fn set_mempool(&mut self, mempool: Arc<Mempool>) {
        self.mempool = mempool;
    }

    /// Returns the current mempool snapshot.
    #[must_use]
    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Replaces the aggregate mempool information and throughput.
    pub fn set_mempool_info(&mut self, info: MempoolInfo, vbytes_per_second: u64) {
        self.mempool_info = info;
        self.vbytes_per_second = vbytes_per_second;
    }

    /// Returns the aggregate mempool information.
    #[must_use]
    pub const fn mempool_info(&self) -> &MempoolInfo {
        &self.mempool_info
    }

    /// Returns the incoming vbytes per second.
    #[must_use]
    pub const fn vbytes_per_second(&self) -> u64 {
        self.vbytes_per_second
    }

    /// Recomputes the mempool-block projection from `mempool`.
    pub fn update_mempool_blocks(&mut self, mempool: &Mempool) {
        self.mempool_blocks = project_mempool_blocks(mempool);
        debug!("Mempool projection now has {} blocks", self.mempool_blocks.len());
    }

    /// Returns the last computed projection.
    #[must_use]
    pub fn mempool_blocks(&self) -> &[MempoolBlock] {
        &self.mempool_blocks
    }

    /// Records the latest price for a fiat pair.
    pub fn set_fiat_tick(&mut self, pair: impl Into<String>, price: f64) {
        self.tickers.insert(pair.into(), price);
    }

    /// Returns the latest price for a fiat pair, if one was recorded.
    #[must_use]
    pub fn fiat_tick(&self, pair: &str) -> Option<f64> {
        self.tickers.get(pair).copied()
    }
}
