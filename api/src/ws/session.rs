//! Per-connection subscription and tracking state.
//!
//! A session starts with every topic off and nothing tracked. It is changed
//! by its own client's control messages, and by the dispatcher when a
//! tracked transaction is delivered.

use mempulse_chain::{Mempool, Transaction};

use super::messages::Topic;
use super::validate::{is_address, is_txid};

/// Subscription and tracking state of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSession {
    want_blocks: bool,
    want_mempool_blocks: bool,
    want_live_chart: bool,
    want_stats: bool,

    /// Transaction to report when it confirms.
    track_tx: Option<String>,

    /// Transaction to report when it enters the mempool.
    track_mempool_tx: Option<String>,

    /// Address whose transactions are reported.
    track_address: Option<String>,
}

impl ClientSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the client wants new blocks.
    #[must_use]
    pub const fn wants_blocks(&self) -> bool {
        self.want_blocks
    }

    /// Returns true if the client wants the mempool-block projection.
    #[must_use]
    pub const fn wants_mempool_blocks(&self) -> bool {
        self.want_mempool_blocks
    }

    /// Returns true if the client wants live-chart statistics.
    #[must_use]
    pub const fn wants_live_chart(&self) -> bool {
        self.want_live_chart
    }

    /// Returns true if the client wants mempool info and throughput.
    #[must_use]
    pub const fn wants_stats(&self) -> bool {
        self.want_stats
    }

    /// Returns the transaction tracked for confirmation.
    #[must_use]
    pub fn track_tx(&self) -> Option<&str> {
        self.track_tx.as_deref()
    }

    /// Returns the transaction tracked for mempool arrival.
    #[must_use]
    pub fn track_mempool_tx(&self) -> Option<&str> {
        self.track_mempool_tx.as_deref()
    }

    /// Returns the tracked address.
    #[must_use]
    pub fn track_address(&self) -> Option<&str> {
        self.track_address.as_deref()
    }

    /// Replaces the set of wanted topics.
    ///
    /// Every flag is overwritten: topics missing from `topics` are turned off.
    /// Unknown topic names are ignored.
    pub fn update_wants<'a, I>(&mut self, topics: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let topics: Vec<Topic> = topics.into_iter().filter_map(Topic::parse).collect();
        self.want_blocks = topics.contains(&Topic::Blocks);
        self.want_mempool_blocks = topics.contains(&Topic::MempoolBlocks);
        self.want_live_chart = topics.contains(&Topic::LiveChart);
        self.want_stats = topics.contains(&Topic::Stats);
    }

    /// Sets the transaction tracked for confirmation.
    ///
    /// An invalid id clears the tracked transaction. When the id is valid and
    /// `watch_mempool` is set, it is looked up in `mempool`: a hit is returned
    /// for an immediate reply, a miss arms mempool tracking for the same id.
    pub fn set_track_tx(
        &mut self,
        candidate: &str,
        watch_mempool: bool,
        mempool: &Mempool,
    ) -> Option<Transaction> {
        if !is_txid(candidate) {
            self.track_tx = None;
            return None;
        }

        self.track_tx = Some(candidate.to_string());
        if !watch_mempool {
            return None;
        }

        match mempool.get(candidate) {
            Some(tx) => Some(tx.clone()),
            None => {
                self.track_mempool_tx = Some(candidate.to_string());
                None
            }
        }
    }

    /// Sets the tracked address. An invalid address clears it.
    pub fn set_track_address(&mut self, candidate: &str) {
        self.track_address = is_address(candidate).then(|| candidate.to_string());
    }

    /// Finds the mempool-tracked transaction among `transactions`.
    ///
    /// A match disarms mempool tracking, so each arming is delivered once.
    pub fn take_mempool_match(&mut self, transactions: &[Transaction]) -> Option<Transaction> {
        let txid = self.track_mempool_tx.as_deref()?;
        let tx = transactions.iter().find(|tx| tx.txid == txid)?.clone();
        self.track_mempool_tx = None;
        Some(tx)
    }

    /// Returns true, and stops tracking, if the tracked transaction is in `txids`.
    pub fn take_confirmation(&mut self, txids: &[String]) -> bool {
        let confirmed = self
            .track_tx
            .as_ref()
            .is_some_and(|tracked| txids.contains(tracked));
        if confirmed {
            self.track_tx = None;
        }
        confirmed
    }
}
