//! Transaction types.
//!
//! Mirrors the Esplora transaction shape so clients can render the
//! objects they receive without a second lookup.

use serde::{Deserialize, Serialize};

use super::block::Block;

/// A transaction output, also used as the resolved previous output of an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Locking script (hex encoded).
    #[serde(default)]
    pub scriptpubkey: String,

    /// Address derived from the locking script, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scriptpubkey_address: Option<String>,

    /// Output value in satoshis.
    pub value: u64,
}

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Id of the transaction being spent.
    pub txid: String,

    /// Index of the output being spent.
    pub vout: u32,

    /// The output being spent, when upstream could resolve it.
    #[serde(default)]
    pub prevout: Option<TxOutput>,

    /// Whether this is a coinbase input.
    #[serde(default)]
    pub is_coinbase: bool,
}

/// Confirmation status of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    /// Whether the transaction is in a block.
    pub confirmed: bool,

    /// Height of the confirming block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_height: Option<u64>,

    /// Hash of the confirming block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,

    /// Timestamp of the confirming block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
}

impl TxStatus {
    /// Creates the status of a transaction confirmed in `block`.
    #[must_use]
    pub fn confirmed_in(block: &Block) -> Self {
        Self {
            confirmed: true,
            block_height: Some(block.height),
            block_hash: Some(block.id.clone()),
            block_time: Some(block.timestamp),
        }
    }
}

/// A transaction as published by the mempool and block producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id (64 hex characters).
    pub txid: String,

    /// Inputs.
    #[serde(default)]
    pub vin: Vec<TxInput>,

    /// Outputs.
    #[serde(default)]
    pub vout: Vec<TxOutput>,

    /// Serialized size in bytes.
    #[serde(default)]
    pub size: u64,

    /// Weight in weight units.
    #[serde(default)]
    pub weight: u64,

    /// Fee paid in satoshis.
    #[serde(default)]
    pub fee: u64,

    /// Confirmation status.
    #[serde(default)]
    pub status: TxStatus,
}

impl Transaction {
    /// Returns the virtual size in vbytes.
    #[must_use]
    pub fn vsize(&self) -> u64 {
        self.weight.div_ceil(4)
    }

    /// Returns the fee rate in sat/vB.
    #[must_use]
    pub fn fee_rate(&self) -> f64 {
        let vsize = self.vsize();
        if vsize == 0 {
            return 0.0;
        }
        self.fee as f64 / vsize as f64
    }

    /// Returns true if `address` funds any input or receives any output.
    #[must_use]
    pub fn involves_address(&self, address: &str) -> bool {
        let spends = self.vin.iter().any(|input| {
            input
                .prevout
                .as_ref()
                .and_then(|prevout| prevout.scriptpubkey_address.as_deref())
                == Some(address)
        });

        spends
            || self
                .vout
                .iter()
                .any(|output| output.scriptpubkey_address.as_deref() == Some(address))
    }

    /// Marks the transaction as confirmed in `block`.
    pub fn confirm(&mut self, block: &Block) {
        self.status = TxStatus::confirmed_in(block);
    }
}
