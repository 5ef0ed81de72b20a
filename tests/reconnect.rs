//! Reconnect scenario against a local mock upstream (a raw `TcpListener` plus
//! `tokio_tungstenite`'s server-side handshake) instead of a live feed.
//! Exercises the full dial -> auth -> subscribe -> read -> disconnect ->
//! backoff -> redial cycle described in SPEC_FULL.md §8 scenario 4.

use futures::{SinkExt, StreamExt};
use massive_ingest::reader::{run, FeedSpec};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn reader_redials_and_resumes_after_the_upstream_drops_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock upstream");
    let addr = listener.local_addr().unwrap();
    // FeedSpec wants a `'static` url (the three concrete feeds use string
    // literals); leaking a test-only address is the simplest way to get one.
    let url: &'static str = Box::leak(format!("ws://{addr}").into_boxed_str());

    let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let received_task = received.clone();

    let cancel = CancellationToken::new();
    let reader_cancel = cancel.clone();
    let spec = FeedSpec {
        name: "test",
        url,
        api_key: "test-key",
        topics: vec!["Q.*".to_string()],
    };
    let reader = tokio::spawn(run(spec, reader_cancel, move |text: &str| {
        received_task.lock().unwrap().push(text.to_string());
    }));

    // First connection: drain the auth+subscribe control frames, deliver one
    // data frame, then drop the socket to force a reconnect.
    let (socket, _) = listener.accept().await.expect("first dial");
    let mut ws = tokio_tungstenite::accept_async(socket).await.expect("first handshake");
    let auth = ws.next().await.expect("auth frame").expect("auth frame ok");
    let subscribe = ws.next().await.expect("subscribe frame").expect("subscribe frame ok");
    assert!(auth.to_text().unwrap().contains("\"action\":\"auth\""));
    assert!(subscribe.to_text().unwrap().contains("\"action\":\"subscribe\""));
    ws.send(Message::Text(
        r#"[{"ev":"Q","sym":"AAPL","bp":1.0,"bs":"1","ap":1.0,"as":"1","t":1}]"#.to_string().into(),
    ))
    .await
    .expect("send first frame");
    drop(ws);

    // The reader now sits in its backoff sleep (initial delay 5s) before
    // redialing. Wait for the real redial rather than mocking time, since
    // the reconnect path mixes socket I/O with timers.
    let (socket2, _) = tokio::time::timeout(Duration::from_secs(8), listener.accept())
        .await
        .expect("reader must redial within one backoff interval")
        .expect("second dial");
    let mut ws2 = tokio_tungstenite::accept_async(socket2).await.expect("second handshake");
    let _ = ws2.next().await; // auth
    let _ = ws2.next().await; // subscribe
    ws2.send(Message::Text(
        r#"[{"ev":"Q","sym":"MSFT","bp":2.0,"bs":"2","ap":2.0,"as":"2","t":2}]"#.to_string().into(),
    ))
    .await
    .expect("send second frame");

    // Give the reader a moment to process the post-reconnect frame before
    // cancelling it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    reader.await.expect("reader task must not panic");

    let frames = received.lock().unwrap();
    assert_eq!(
        frames.len(),
        2,
        "exactly the pre- and post-reconnect frames must be delivered, with no loss and no duplication"
    );
    assert!(frames[0].contains("AAPL"), "first frame survives the reconnect unduplicated");
    assert!(frames[1].contains("MSFT"), "second frame arrives after redial");
}
