//! Integration tests against the live Luno stream
//!
//! These tests make real WebSocket connections and need API credentials in
//! `LUNO_API_KEY_ID` / `LUNO_API_KEY_SECRET`.
//! Run with: cargo test -p luno-stream --test integration_tests -- --ignored

use luno_stream::{Credentials, LunoError, MarketHandle, StreamConfig};
use std::time::Duration;
use tokio::time::timeout;

/// Test that we receive the initial snapshot
#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_receives_snapshot() {
    let credentials = Credentials::from_env().expect("Credentials should be set");
    let mut handle = MarketHandle::spawn("XBTZAR", credentials, StreamConfig::default())
        .expect("Should spawn stream");
    let mut events = handle.take_event_receiver().expect("Should have receiver");

    let first = timeout(Duration::from_secs(30), events.recv())
        .await
        .expect("Timed out waiting for snapshot")
        .expect("Stream ended before snapshot");

    assert!(first.is_snapshot());
    assert!(first.state.sequence > 0);
    assert!(handle.latest().is_some());

    handle.abort();
}

/// Test that updates keep the book sorted and advance the sequence
#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_updates_advance_sequence() {
    let credentials = Credentials::from_env().expect("Credentials should be set");
    let mut handle = MarketHandle::spawn("XBTZAR", credentials, StreamConfig::default())
        .expect("Should spawn stream");
    let mut events = handle.take_event_receiver().expect("Should have receiver");

    let mut last_sequence = 0;
    let mut updates = 0;
    let _ = timeout(Duration::from_secs(60), async {
        while let Some(event) = events.recv().await {
            assert!(event.state.sequence > last_sequence);
            assert!(event.state.asks.windows(2).all(|w| w[0].price <= w[1].price));
            assert!(event.state.bids.windows(2).all(|w| w[0].price >= w[1].price));
            last_sequence = event.state.sequence;
            updates += 1;
            if updates >= 10 {
                break;
            }
        }
    })
    .await;

    assert!(updates > 0, "Should have received at least the snapshot");
    handle.abort();
}

/// Invalid symbols fail before any network traffic
#[test]
fn test_invalid_symbol() {
    let result = MarketHandle::spawn(
        "BTC/USD",
        Credentials::new("id", "secret"),
        StreamConfig::default(),
    );
    assert!(matches!(result, Err(LunoError::InvalidPair(_))));
}
