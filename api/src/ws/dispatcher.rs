//! Outbound broadcast dispatcher.
//!
//! Turns upstream changes into per-client messages. Each entry point reads
//! the shared inputs once, then builds and sends one message per interested
//! client, skipping clients whose connection has closed. Delivery is best
//! effort: nothing is retried and nothing is reported to the caller.

use std::sync::Arc;

use mempulse_chain::{Block, ChainEvent, ChainState, Mempool, Statistic, Transaction};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use super::connection::Connection;
use super::messages::ServerMessage;
use super::metrics::WsMetrics;
use super::registry::ClientRegistry;
use crate::error::ApiError;

/// Computes and sends personalized broadcasts to every live client.
#[derive(Debug)]
pub struct Dispatcher {
    /// Live connections.
    registry: Arc<ClientRegistry>,

    /// Upstream snapshots.
    chain: Arc<RwLock<ChainState>>,

    /// Metrics.
    metrics: Arc<WsMetrics>,
}

/// Builder for [`Dispatcher`].
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    registry: Option<Arc<ClientRegistry>>,
    chain: Option<Arc<RwLock<ChainState>>>,
    metrics: Option<Arc<WsMetrics>>,
}

impl DispatcherBuilder {
    /// Attaches the client registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<ClientRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Attaches the chain state.
    #[must_use]
    pub fn chain(mut self, chain: Arc<RwLock<ChainState>>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Attaches shared metrics. A fresh instance is used otherwise.
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<WsMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotAttached`] if the registry or the chain state
    /// was not provided.
    pub fn build(self) -> Result<Dispatcher, ApiError> {
        Ok(Dispatcher {
            registry: self
                .registry
                .ok_or(ApiError::NotAttached("client registry"))?,
            chain: self.chain.ok_or(ApiError::NotAttached("chain state"))?,
            metrics: self.metrics.unwrap_or_default(),
        })
    }
}

impl Dispatcher {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Returns the metrics.
    #[must_use]
    pub fn metrics(&self) -> Arc<WsMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Sends a new live-chart statistic to clients that want it.
    ///
    /// Returns the number of clients the message was queued for.
    pub async fn on_statistic(&self, stat: &Statistic) -> usize {
        let mut delivered = 0;

        for connection in self.open_connections().await {
            if !connection.session().await.wants_live_chart() {
                continue;
            }
            if self.deliver(&connection, ServerMessage::live_chart(stat.clone())) {
                delivered += 1;
            }
        }

        self.metrics.record_statistic_broadcasts(delivered as u64);
        debug!("Statistic sent to {} clients", delivered);
        delivered
    }

    /// Sends mempool updates after a mempool change.
    ///
    /// The projection is recomputed once from `mempool`. Each client then
    /// receives the topics it wants, its mempool-tracked transaction if it
    /// is among `new_transactions`, and the new transactions touching its
    /// tracked address.
    ///
    /// Returns the number of clients a message was queued for.
    pub async fn on_mempool_change(
        &self,
        mempool: &Mempool,
        new_transactions: &[Transaction],
    ) -> usize {
        let (mempool_blocks, mempool_info, vbytes_per_second) = {
            let mut chain = self.chain.write().await;
            chain.update_mempool_blocks(mempool);
            (
                chain.mempool_blocks().to_vec(),
                chain.mempool_info().clone(),
                chain.vbytes_per_second(),
            )
        };

        let mut delivered = 0;

        for connection in self.open_connections().await {
            let mut response = ServerMessage::default();
            {
                let mut session = connection.session().await;

                if session.wants_stats() {
                    response.mempool_info = Some(mempool_info.clone());
                    response.vbytes_per_second = Some(vbytes_per_second);
                }

                if session.wants_mempool_blocks() {
                    response.mempool_blocks = Some(mempool_blocks.clone());
                }

                response.tx = session.take_mempool_match(new_transactions);

                if let Some(address) = session.track_address() {
                    let found: Vec<Transaction> = new_transactions
                        .iter()
                        .filter(|tx| tx.involves_address(address))
                        .cloned()
                        .collect();
                    if !found.is_empty() {
                        response.address_transactions = Some(found);
                    }
                }
            }

            if !response.is_empty() && self.deliver(&connection, response) {
                delivered += 1;
            }
        }

        self.metrics.record_mempool_broadcasts(delivered as u64);
        debug!(
            "Mempool change ({} new transactions) sent to {} clients",
            new_transactions.len(),
            delivered
        );
        delivered
    }

    /// Sends a new block to clients that want blocks.
    ///
    /// Every such client receives the block. A client whose tracked
    /// transaction is in `txids` is told it confirmed and stops tracking it.
    /// Transactions in `transactions` that touch a client's tracked address
    /// are marked confirmed in place and attached.
    ///
    /// Returns the number of clients the block was queued for.
    pub async fn on_new_block(
        &self,
        block: &Block,
        txids: &[String],
        transactions: &mut [Transaction],
    ) -> usize {
        let mut delivered = 0;

        for connection in self.open_connections().await {
            let mut response = ServerMessage::block(block.clone());
            {
                let mut session = connection.session().await;

                if !session.wants_blocks() {
                    continue;
                }

                if session.take_confirmation(txids) {
                    response.tx_confirmed = Some(true);
                }

                if let Some(address) = session.track_address() {
                    let found: Vec<Transaction> = transactions
                        .iter_mut()
                        .filter(|tx| tx.involves_address(address))
                        .map(|tx| {
                            tx.confirm(block);
                            tx.clone()
                        })
                        .collect();
                    if !found.is_empty() {
                        response.address_block_transactions = Some(found);
                    }
                }
            }

            if self.deliver(&connection, response) {
                delivered += 1;
            }
        }

        self.metrics.record_block_broadcasts(delivered as u64);
        debug!("Block {} sent to {} clients", block.height, delivered);
        delivered
    }

    /// Records an upstream event in the chain state, then routes it to its
    /// entry point.
    ///
    /// Returns the number of clients a message was queued for.
    pub async fn dispatch(&self, event: ChainEvent) -> usize {
        self.chain.write().await.apply(&event);

        match event {
            ChainEvent::Statistic(stat) => self.on_statistic(&stat).await,
            ChainEvent::MempoolChange {
                mempool,
                new_transactions,
            } => self.on_mempool_change(&mempool, &new_transactions).await,
            ChainEvent::NewBlock {
                block,
                txids,
                mut transactions,
            } => self.on_new_block(&block, &txids, &mut transactions).await,
        }
    }

    /// Consumes upstream events until every sender is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<ChainEvent>) {
        info!("Dispatcher started");

        while let Some(event) = events.recv().await {
            let kind = event.kind();
            let delivered = self.dispatch(event).await;
            debug!("Dispatched {} event to {} clients", kind, delivered);
        }

        info!("Chain event feed closed, dispatcher stopped");
    }

    /// Returns the registered connections that are still open.
    async fn open_connections(&self) -> Vec<Arc<Connection>> {
        self.registry
            .snapshot()
            .await
            .into_iter()
            .filter(|connection| connection.is_open())
            .collect()
    }

    /// Queues a message, counting it as dropped if it could not be queued.
    fn deliver(&self, connection: &Connection, message: ServerMessage) -> bool {
        let sent = connection.send(message);
        if !sent {
            self.metrics.record_dropped_message();
        }
        sent
    }
}
