//! Block types.
//!
//! Blocks are reported upstream once they are accepted by the node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A confirmed block header summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block hash (hex encoded).
    pub id: String,

    /// Block height.
    pub height: u64,

    /// Block timestamp in seconds since epoch.
    pub timestamp: i64,

    /// Number of transactions in the block.
    pub tx_count: u32,

    /// Serialized size in bytes.
    pub size: u64,

    /// Block weight in weight units.
    pub weight: u64,

    /// Hash of the parent block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<String>,
}

impl Block {
    /// Returns the block time as a UTC datetime.
    ///
    /// Returns None if the timestamp is out of range.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    /// Returns the virtual size of the block.
    #[must_use]
    pub fn vsize(&self) -> u64 {
        self.weight.div_ceil(4)
    }
}
