// tests/launcher.rs

#![cfg(unix)]

mod common;
use crate::common::init_tracing;

use std::time::Instant;

use tokio::time::{Duration, timeout};

use pglisten::errors::BridgeError;
use pglisten::exec::{DispatchSink, ProcessSink};

#[tokio::test]
async fn child_receives_exact_payload_on_stdin() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("payload.txt");

    let mut sink = ProcessSink::new(
        "sh",
        vec!["-c".to_string(), format!("cat > {}", out.display())],
        4,
    );

    sink.dispatch("ping".to_string()).await.unwrap();
    timeout(Duration::from_secs(10), sink.shutdown())
        .await
        .expect("reap timed out");

    let written = std::fs::read(&out).unwrap();
    assert_eq!(
        written, b"ping",
        "child must see the payload with no trailing byte"
    );
}

#[tokio::test]
async fn spawn_failure_is_a_fatal_error() {
    init_tracing();

    let mut sink = ProcessSink::new("/definitely/not/a/real/program", Vec::new(), 4);
    let err = timeout(Duration::from_secs(3), sink.dispatch("x".to_string()))
        .await
        .expect("dispatch timed out")
        .expect_err("spawning a missing executable must fail");
    assert!(matches!(err, BridgeError::Spawn { .. }));
}

#[tokio::test]
async fn failing_child_does_not_fail_dispatch() {
    init_tracing();

    // The child exits without reading stdin; the payload write hits a
    // closed pipe inside the waiter task, which must stay isolated.
    let mut sink = ProcessSink::new("sh", vec!["-c".to_string(), "exit 3".to_string()], 4);
    sink.dispatch("ignored".to_string()).await.unwrap();
    timeout(Duration::from_secs(10), sink.shutdown())
        .await
        .expect("reap timed out");
}

#[tokio::test]
async fn dispatch_continues_after_a_failed_child() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("after.txt");

    let mut sink = ProcessSink::new(
        "sh",
        vec!["-c".to_string(), format!("cat >> {}", out.display())],
        4,
    );

    // First child fails on its own; the next notification must still land.
    let mut failing = ProcessSink::new("sh", vec!["-c".to_string(), "exit 1".to_string()], 4);
    failing.dispatch("doomed".to_string()).await.unwrap();
    timeout(Duration::from_secs(10), failing.shutdown())
        .await
        .expect("reap timed out");

    sink.dispatch("still-alive".to_string()).await.unwrap();
    timeout(Duration::from_secs(10), sink.shutdown())
        .await
        .expect("reap timed out");

    assert_eq!(std::fs::read(&out).unwrap(), b"still-alive");
}

#[tokio::test]
async fn concurrency_cap_applies_backpressure() {
    init_tracing();

    let mut sink = ProcessSink::new("sh", vec!["-c".to_string(), "sleep 1".to_string()], 1);

    let started = Instant::now();
    sink.dispatch("a".to_string()).await.unwrap();
    // With a single permit this has to wait for the first child to exit.
    timeout(Duration::from_secs(10), sink.dispatch("b".to_string()))
        .await
        .expect("second dispatch never acquired a permit")
        .unwrap();
    let elapsed = started.elapsed();

    timeout(Duration::from_secs(10), sink.shutdown())
        .await
        .expect("reap timed out");

    assert!(
        elapsed >= Duration::from_millis(800),
        "second dispatch returned after {elapsed:?}; expected it to wait for a permit"
    );
}

#[tokio::test]
async fn shutdown_reaps_all_outstanding_children() {
    init_tracing();

    let mut sink = ProcessSink::new("sh", vec!["-c".to_string(), "sleep 0".to_string()], 8);
    for i in 0..5 {
        sink.dispatch(format!("payload-{i}")).await.unwrap();
    }

    timeout(Duration::from_secs(10), sink.shutdown())
        .await
        .expect("reap timed out");
    assert_eq!(sink.outstanding(), 0);
}
