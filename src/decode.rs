//! Frame decoding and lane dispatch.
//!
//! One upstream text message carries a JSON array of sub-frames, each
//! tagged by an `ev` field. A malformed outer array drops the whole
//! message (and is logged); a malformed or unrecognized sub-frame drops
//! only that sub-frame. Neither ever tears down the connection — see
//! SPEC_FULL.md §4.4.

use crate::model::{CryptoQuote, CryptoTrade, Fmv, StockQuote, StockTrade};
use crate::queue::LaneQueue;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Deserialize)]
struct EventTag {
    ev: Option<String>,
}

/// The lane queues a stock-feed connection decodes into.
pub struct StockLanes {
    pub quotes: Arc<LaneQueue<StockQuote>>,
    pub trades: Arc<LaneQueue<StockTrade>>,
}

/// The lane queues a crypto-feed connection decodes into.
pub struct CryptoLanes {
    pub quotes: Arc<LaneQueue<CryptoQuote>>,
    pub trades: Arc<LaneQueue<CryptoTrade>>,
}

pub fn dispatch_stock_message(text: &str, lanes: &StockLanes) {
    for frame in split_frames(text) {
        match tag_of(&frame) {
            Some("Q") => decode_and_offer(frame, "Q", StockQuote::from_json, &lanes.quotes),
            Some("T") => decode_and_offer(frame, "T", StockTrade::from_json, &lanes.trades),
            Some(_) | None => {}
        }
    }
}

pub fn dispatch_crypto_message(text: &str, lanes: &CryptoLanes) {
    for frame in split_frames(text) {
        match tag_of(&frame) {
            Some("XQ") => decode_and_offer(frame, "XQ", CryptoQuote::from_json, &lanes.quotes),
            Some("XT") => decode_and_offer(frame, "XT", CryptoTrade::from_json, &lanes.trades),
            Some(_) | None => {}
        }
    }
}

pub fn dispatch_fmv_message(text: &str, fmv: &Arc<LaneQueue<Fmv>>) {
    for frame in split_frames(text) {
        if tag_of(&frame).as_deref() == Some("FMV") {
            decode_and_offer(frame, "FMV", Fmv::from_json, fmv);
        }
    }
}

fn split_frames(text: &str) -> Vec<Value> {
    match serde_json::from_str::<Vec<Value>>(text) {
        Ok(frames) => frames,
        Err(e) => {
            warn!(error = %e, "malformed outer frame, dropping message");
            Vec::new()
        }
    }
}

fn tag_of(frame: &Value) -> Option<String> {
    serde_json::from_value::<EventTag>(frame.clone())
        .ok()
        .and_then(|t| t.ev)
}

fn decode_and_offer<T>(
    frame: Value,
    kind: &'static str,
    from_json: impl Fn(Value) -> Result<T, crate::error::DecodeError>,
    queue: &LaneQueue<T>,
) {
    match from_json(frame) {
        Ok(record) => {
            if !queue.offer(record) {
                debug!(kind, "lane full, record rejected at offer");
            }
        }
        Err(e) => warn!(kind, error = %e, "decode failed, dropping record"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_ev_tag_is_silently_ignored() {
        let lanes = StockLanes {
            quotes: Arc::new(LaneQueue::new(4)),
            trades: Arc::new(LaneQueue::new(4)),
        };
        dispatch_stock_message(r#"[{"ev":"status","message":"connected"}]"#, &lanes);
        assert!(lanes.quotes.is_empty());
        assert!(lanes.trades.is_empty());
    }

    #[test]
    fn malformed_outer_array_does_not_panic() {
        let lanes = StockLanes {
            quotes: Arc::new(LaneQueue::new(4)),
            trades: Arc::new(LaneQueue::new(4)),
        };
        dispatch_stock_message("not json", &lanes);
        assert!(lanes.quotes.is_empty());
    }

    #[test]
    fn one_malformed_subframe_does_not_block_its_siblings() {
        let lanes = StockLanes {
            quotes: Arc::new(LaneQueue::new(4)),
            trades: Arc::new(LaneQueue::new(4)),
        };
        let msg = r#"[
            {"ev":"Q","sym":"BAD"},
            {"ev":"Q","sym":"AAPL","bp":1.0,"bs":"1","ap":1.0,"as":"1","t":1}
        ]"#;
        dispatch_stock_message(msg, &lanes);
        assert_eq!(lanes.quotes.len(), 1);
    }

    #[test]
    fn crypto_message_routes_quotes_and_trades_independently() {
        let lanes = CryptoLanes {
            quotes: Arc::new(LaneQueue::new(4)),
            trades: Arc::new(LaneQueue::new(4)),
        };
        let msg = r#"[
            {"ev":"XQ","pair":"BTC-USD","bp":1.0,"bs":1.0,"ap":1.0,"as":1.0,"t":1},
            {"ev":"XT","pair":"BTC-USD","p":1.0,"t":1,"s":1.0}
        ]"#;
        dispatch_crypto_message(msg, &lanes);
        assert_eq!(lanes.quotes.len(), 1);
        assert_eq!(lanes.trades.len(), 1);
    }
}
