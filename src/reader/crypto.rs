//! The crypto feed: quotes (`XQ.*`) and trades (`XT.*`).

use super::{run, FeedSpec};
use crate::decode::{dispatch_crypto_message, CryptoLanes};
use tokio_util::sync::CancellationToken;

const URL: &str = "wss://socket.polygon.io/crypto";

pub async fn run_crypto(api_key: &str, lanes: CryptoLanes, cancel: CancellationToken) {
    let spec = FeedSpec {
        name: "crypto",
        url: URL,
        api_key,
        topics: vec!["XQ.*".to_string(), "XT.*".to_string()],
    };
    run(spec, cancel, |text| dispatch_crypto_message(text, &lanes)).await;
}
