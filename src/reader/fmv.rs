//! The fair-market-value feed: `FMV.*`.

use super::{run, FeedSpec};
use crate::decode::dispatch_fmv_message;
use crate::model::Fmv;
use crate::queue::LaneQueue;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const URL: &str = "wss://business.polygon.io/stocks";

pub async fn run_fmv(api_key: &str, fmv: Arc<LaneQueue<Fmv>>, cancel: CancellationToken) {
    let spec = FeedSpec {
        name: "fmv",
        url: URL,
        api_key,
        topics: vec!["FMV.*".to_string()],
    };
    run(spec, cancel, |text| dispatch_fmv_message(text, &fmv)).await;
}
