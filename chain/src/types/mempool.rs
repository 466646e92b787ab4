//! Mempool snapshot types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Mempool snapshot, keyed by transaction id.
pub type Mempool = HashMap<String, Transaction>;

/// Aggregate mempool information as reported by the node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MempoolInfo {
    /// Number of transactions.
    pub size: u64,

    /// Sum of transaction virtual sizes.
    pub bytes: u64,

    /// Memory usage in bytes.
    pub usage: u64,

    /// Maximum memory usage in bytes.
    pub maxmempool: u64,

    /// Minimum fee rate accepted, in BTC/kvB.
    pub mempoolminfee: f64,

    /// Minimum relay fee rate, in BTC/kvB.
    pub minrelaytxfee: f64,
}

/// One projected block of pending transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MempoolBlock {
    /// Sum of serialized sizes.
    pub block_size: u64,

    /// Sum of virtual sizes.
    #[serde(rename = "blockVSize")]
    pub block_vsize: u64,

    /// Number of transactions.
    pub n_tx: usize,

    /// Sum of fees in satoshis.
    pub total_fees: u64,

    /// Median fee rate in sat/vB.
    pub median_fee: f64,

    /// Fee rate percentiles (0, 10, 25, 50, 75, 90, 100) in sat/vB.
    pub fee_range: Vec<f64>,
}

/// A time-bucketed mempool statistic, pushed to the live chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistic {
    /// Storage id of the bucket, if persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// When the bucket was recorded.
    pub added: DateTime<Utc>,

    /// Transactions in the mempool.
    pub unconfirmed_transactions: u64,

    /// Incoming transactions per second.
    pub tx_per_second: f64,

    /// Incoming vbytes per second.
    pub vbytes_per_second: u64,

    /// Total mempool weight in vbytes.
    pub mempool_byte_weight: u64,

    /// Total fees in satoshis.
    pub total_fee: u64,

    /// Vbytes per fee-rate bucket.
    #[serde(default)]
    pub vsizes: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mempool_block_field_names() {
        let block = MempoolBlock {
            block_size: 10,
            block_vsize: 5,
            n_tx: 1,
            total_fees: 100,
            median_fee: 20.0,
            fee_range: vec![20.0],
        };
        let json = serde_json::to_value(&block).expect("serialize");
        assert_eq!(json["blockVSize"], 5);
        assert_eq!(json["nTx"], 1);
        assert_eq!(json["medianFee"], 20.0);
    }

    #[test]
    fn test_statistic_roundtrip_added() {
        let json = r#"{"added":"2024-01-01T00:00:00Z","unconfirmed_transactions":5,
            "tx_per_second":1.5,"vbytes_per_second":900,"mempool_byte_weight":4000,
            "total_fee":12000}"#;
        let stat: Statistic = serde_json::from_str(json).expect("deserialize");
        assert_eq!(stat.unconfirmed_transactions, 5);
        assert!(stat.vsizes.is_empty());
        assert_eq!(stat.added.timestamp(), 1_704_067_200);
    }
}
