//! Value types published by upstream producers.

pub mod block;
pub mod mempool;
pub mod transaction;

pub use block::Block;
pub use mempool::{Mempool, MempoolBlock, MempoolInfo, Statistic};
pub use transaction::{Transaction, TxInput, TxOutput, TxStatus};
