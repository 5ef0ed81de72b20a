//! Reconnecting upstream feed readers.
//!
//! All three feeds (stocks, crypto, fair-market-value) share one dial/
//! auth/subscribe/read loop; what differs between them is the endpoint
//! URL, the subscription topics, and which lanes a decoded frame lands
//! in. [`run`] takes a per-feed [`FeedSpec`] and stays connected until
//! `cancel` fires.

pub mod crypto;
pub mod fmv;
pub mod stocks;

use crate::{BACKOFF_CEILING, BACKOFF_INITIAL, BACKOFF_MULTIPLIER};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Everything the generic dial loop needs to know about one feed.
pub struct FeedSpec<'a> {
    pub name: &'static str,
    pub url: &'static str,
    pub api_key: &'a str,
    pub topics: Vec<String>,
}

/// Drives one feed's reconnect state machine until cancelled. `on_message`
/// is called with each text frame received on the socket; it owns
/// decoding and lane dispatch so this module stays wire-protocol-only.
pub async fn run(spec: FeedSpec<'_>, cancel: CancellationToken, mut on_message: impl FnMut(&str)) {
    let mut backoff = BACKOFF_INITIAL;

    loop {
        if cancel.is_cancelled() {
            return;
        }

        let dial = tokio_tungstenite::connect_async(spec.url);
        let (stream, _response) = tokio::select! {
            result = dial => match result {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(feed = spec.name, error = %e, backoff_secs = backoff.as_secs(), "dial failed, retrying");
                    sleep_or_cancel(backoff, &cancel).await;
                    backoff = next_backoff(backoff);
                    continue;
                }
            },
            _ = cancel.cancelled() => return,
        };

        backoff = BACKOFF_INITIAL; // reset on successful dial, not on auth/subscribe

        let (mut write, mut read) = stream.split();
        let auth = json!({"action": "auth", "params": spec.api_key}).to_string();
        let subscribe = json!({"action": "subscribe", "params": spec.topics.join(",")}).to_string();
        let _ = write.send(Message::Text(auth.into())).await;
        let _ = write.send(Message::Text(subscribe.into())).await;
        info!(feed = spec.name, url = spec.url, "connected");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = write.close().await;
                    return;
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => on_message(&text),
                        Some(Ok(Message::Close(_))) | None => {
                            warn!(feed = spec.name, backoff_secs = backoff.as_secs(), "connection closed, reconnecting");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!(feed = spec.name, error = %e, backoff_secs = backoff.as_secs(), "read failed, reconnecting");
                            break;
                        }
                    }
                }
            }
        }

        sleep_or_cancel(backoff, &cancel).await;
        backoff = next_backoff(backoff);
    }
}

fn next_backoff(current: Duration) -> Duration {
    (current * BACKOFF_MULTIPLIER).min(BACKOFF_CEILING)
}

async fn sleep_or_cancel(d: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(d) => {}
        _ = cancel.cancelled() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let mut b = BACKOFF_INITIAL;
        for _ in 0..10 {
            b = next_backoff(b);
        }
        assert_eq!(b, BACKOFF_CEILING);
    }

    #[test]
    fn backoff_starts_below_ceiling() {
        assert!(BACKOFF_INITIAL < BACKOFF_CEILING);
    }
}
