//! Mempool-to-block projection.
//!
//! Groups pending transactions into the blocks they would occupy if mined
//! next, highest fee rate first. The last projected block absorbs every
//! transaction that does not fit in the ones before it.

use std::cmp::Ordering;

use tracing::debug;

use crate::types::{Mempool, MempoolBlock, Transaction};

/// Virtual size limit of a projected block.
pub const BLOCK_VSIZE_LIMIT: u64 = 1_000_000;

/// Maximum number of projected blocks.
pub const MAX_PROJECTED_BLOCKS: usize = 8;

/// Percentiles reported in [`MempoolBlock::fee_range`].
const FEE_PERCENTILES: [usize; 7] = [0, 10, 25, 50, 75, 90, 100];

/// Projects a mempool snapshot into fee-ordered blocks.
#[must_use]
pub fn project_mempool_blocks(mempool: &Mempool) -> Vec<MempoolBlock> {
    let mut transactions: Vec<&Transaction> = mempool.values().collect();
    transactions.sort_by(|a, b| {
        b.fee_rate()
            .partial_cmp(&a.fee_rate())
            .unwrap_or(Ordering::Equal)
    });

    let mut blocks: Vec<Vec<&Transaction>> = Vec::new();
    let mut current: Vec<&Transaction> = Vec::new();
    let mut current_vsize = 0u64;

    for tx in transactions {
        let is_last = blocks.len() + 1 >= MAX_PROJECTED_BLOCKS;
        if !is_last && !current.is_empty() && current_vsize + tx.vsize() > BLOCK_VSIZE_LIMIT {
            blocks.push(std::mem::take(&mut current));
            current_vsize = 0;
        }
        current_vsize += tx.vsize();
        current.push(tx);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    debug!(
        "Projected {} transactions into {} blocks",
        mempool.len(),
        blocks.len()
    );

    blocks.iter().map(|txs| summarize(txs)).collect()
}

/// Builds the summary of one projected block. `txs` is sorted by fee rate, descending.
fn summarize(txs: &[&Transaction]) -> MempoolBlock {
    let mut rates: Vec<f64> = txs.iter().map(|tx| tx.fee_rate()).collect();
    rates.reverse();

    let fee_range = if rates.is_empty() {
        Vec::new()
    } else {
        FEE_PERCENTILES
            .iter()
            .filter_map(|p| rates.get((rates.len() - 1) * p / 100).copied())
            .collect()
    };

    MempoolBlock {
        block_size: txs.iter().map(|tx| tx.size).sum(),
        block_vsize: txs.iter().map(|tx| tx.vsize()).sum(),
        n_tx: txs.len(),
        total_fees: txs.iter().map(|tx| tx.fee).sum(),
        median_fee: rates.get(rates.len() / 2).copied().unwrap_or(0.0),
        fee_range,
    }
}
