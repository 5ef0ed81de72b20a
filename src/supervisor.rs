//! Periodic queue-depth sampling and the shedder.
//!
//! Every [`SUPERVISOR_INTERVAL`], logs each lane's depth, then head-drops
//! [`SHED_BATCH`] of the oldest entries from any lane over
//! [`SHED_THRESHOLD_FRACTION`] of capacity. This is deliberately a
//! different lossy policy from the batcher's enqueue-time `offer`
//! rejection: the shedder trades freshness for headroom instead of
//! rejecting the newest arrivals outright — see SPEC_FULL.md §9.

use crate::model::{CryptoQuote, CryptoTrade, Fmv, StockQuote, StockTrade};
use crate::queue::LaneQueue;
use crate::{SHED_BATCH, SHED_THRESHOLD_FRACTION, SUPERVISOR_INTERVAL};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub struct Lanes {
    pub quotes: Arc<LaneQueue<StockQuote>>,
    pub trades: Arc<LaneQueue<StockTrade>>,
    pub crypto_quotes: Arc<LaneQueue<CryptoQuote>>,
    pub crypto_trades: Arc<LaneQueue<CryptoTrade>>,
    pub fmv: Arc<LaneQueue<Fmv>>,
}

pub async fn run(lanes: Lanes, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(SUPERVISOR_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!(
                    quotes = lanes.quotes.len(),
                    trades = lanes.trades.len(),
                    crypto_quotes = lanes.crypto_quotes.len(),
                    crypto_trades = lanes.crypto_trades.len(),
                    fmv = lanes.fmv.len(),
                    "lane depths"
                );
                shed_if_saturated("quotes", &lanes.quotes);
                shed_if_saturated("trades", &lanes.trades);
                shed_if_saturated("crypto_quotes", &lanes.crypto_quotes);
                shed_if_saturated("crypto_trades", &lanes.crypto_trades);
                shed_if_saturated("fmv", &lanes.fmv);
            }
            _ = cancel.cancelled() => {
                info!("supervisor stopped");
                return;
            }
        }
    }
}

fn shed_if_saturated<T>(lane: &'static str, queue: &LaneQueue<T>) {
    let threshold = (queue.capacity() as f64 * SHED_THRESHOLD_FRACTION) as usize;
    if queue.len() > threshold {
        let dropped = queue.drop_head(SHED_BATCH);
        warn!(lane, dropped, threshold, "lane saturated, shedding oldest entries");
    }
}
