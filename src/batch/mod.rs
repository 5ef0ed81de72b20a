//! The generic batcher-writer: one control loop, shared across all five
//! lanes, parameterized by [`columns::LaneBatch`]. Drains its
//! [`LaneQueue`], accumulates rows into the lane's column struct, and
//! flushes to the backend when either trigger fires — whichever comes
//! first wins, there is no coalescing across triggers.

pub mod columns;

pub use columns::{CryptoQuoteColumns, CryptoTradeColumns, FmvColumns, LaneBatch, QuoteColumns, TradeColumns};

use crate::backend::BulkInsertBackend;
use crate::queue::LaneQueue;
use crate::{FLUSH_DEADLINE, N_MAX, T_MAX};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub struct Batcher<B: LaneBatch> {
    lane: &'static str,
    queue: Arc<LaneQueue<B::Record>>,
    backend: Arc<dyn BulkInsertBackend>,
    batch: B,
}

impl<B: LaneBatch> Batcher<B> {
    pub fn new(lane: &'static str, queue: Arc<LaneQueue<B::Record>>, backend: Arc<dyn BulkInsertBackend>) -> Self {
        Self {
            lane,
            queue,
            backend,
            batch: B::default(),
        }
    }

    /// Runs until `cancel` fires, then performs exactly one final flush
    /// before returning. Records already enqueued but not yet flushed at
    /// cancellation are not lost; records still in flight on the socket are
    /// out of scope — the reader stops producing before this loop exits.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(T_MAX);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                record = self.queue.recv() => {
                    if B::accepts(&record) {
                        self.batch.push(record);
                        if self.batch.len() >= N_MAX {
                            self.flush().await;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.flush().await;
                }
                _ = cancel.cancelled() => {
                    self.flush().await;
                    info!(lane = self.lane, "batcher stopped");
                    return;
                }
            }
        }
    }

    async fn flush(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.batch);
        let table = batch.table();
        let rows = batch.len();
        match self.backend.insert(table, batch.into_block(), FLUSH_DEADLINE).await {
            Ok(()) => {
                info!(lane = self.lane, table, rows, "flushed batch");
            }
            Err(e) => {
                // No retry: a failed flush discards its rows rather than
                // risk unbounded memory growth or reordering against the
                // next batch. See SPEC_FULL.md §9.
                error!(lane = self.lane, table, rows, error = %e, "flush failed, rows dropped");
            }
        }
    }
}

impl<B: LaneBatch> Drop for Batcher<B> {
    fn drop(&mut self) {
        if !self.batch.is_empty() {
            warn!(lane = self.lane, rows = self.batch.len(), "batcher dropped with unflushed rows");
        }
    }
}
