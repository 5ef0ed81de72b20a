//! The delayed stock feed: quotes (`Q.*`) and trades (`T.*`).

use super::{run, FeedSpec};
use crate::decode::{dispatch_stock_message, StockLanes};
use tokio_util::sync::CancellationToken;

const URL: &str = "wss://delayed-business.polygon.io/stocks";

pub async fn run_stocks(api_key: &str, lanes: StockLanes, cancel: CancellationToken) {
    let spec = FeedSpec {
        name: "stocks",
        url: URL,
        api_key,
        topics: vec!["Q.*".to_string(), "T.*".to_string()],
    };
    run(spec, cancel, |text| dispatch_stock_message(text, &lanes)).await;
}
