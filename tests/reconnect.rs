// tests/reconnect.rs

mod common;
use crate::common::init_tracing;

use std::time::Instant;

use tokio::time::{Duration, timeout};
use tokio_util::sync::CancellationToken;

use pglisten::db::{BackoffPolicy, PgSession, Reconnector};
use pglisten::errors::BridgeError;

#[tokio::test]
async fn malformed_dsn_fails_fast() {
    init_tracing();

    let err = timeout(
        Duration::from_secs(5),
        PgSession::connect("definitely not a dsn"),
    )
    .await
    .expect("connect timed out")
    .expect_err("nonsense DSN must fail");
    assert!(matches!(err, BridgeError::Connect(_)));
}

#[tokio::test]
async fn shutdown_during_backoff_sleep_is_prompt() {
    init_tracing();

    // Nothing listens on port 1, so every attempt fails quickly and the
    // loop spends its time in the backoff sleep.
    let reconnector = Reconnector::new(
        "host=127.0.0.1 port=1 user=nobody connect_timeout=1",
        BackoffPolicy::default(),
    );

    let shutdown = CancellationToken::new();
    let canceller = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = timeout(Duration::from_secs(5), reconnector.reconnect(&shutdown))
        .await
        .expect("reconnect did not observe cancellation in time")
        .expect_err("reconnect cannot succeed against a closed port");

    assert!(matches!(err, BridgeError::Interrupted));
    // Without the cancellable sleep this would sit out the full backoff
    // ladder; staying well under it shows the signal cut the sleep short.
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn cancelled_token_stops_reconnect_before_sleeping() {
    init_tracing();

    let reconnector = Reconnector::new(
        "host=127.0.0.1 port=1 user=nobody connect_timeout=1",
        BackoffPolicy::default(),
    );

    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let err = timeout(Duration::from_secs(5), reconnector.reconnect(&shutdown))
        .await
        .expect("reconnect did not observe cancellation in time")
        .expect_err("cancelled reconnect must not succeed");
    assert!(matches!(err, BridgeError::Interrupted));
}
