// src/lib.rs

pub mod bridge;
pub mod cli;
pub mod db;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod shutdown;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bridge::Bridge;
use crate::cli::CliArgs;
use crate::db::{BackoffPolicy, ChannelName, PgSession, Reconnector};
use crate::errors::{BridgeError, Result};
use crate::exec::{DispatchSink, ProcessSink, WriterSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the escaped channel identifier
/// - SIGINT/SIGTERM handling
/// - the initial connection (fatal on failure, unlike later reconnects)
/// - the dispatch sink (stdout, or a subprocess per notification)
/// - the bridge loop and its cleanup
///
/// Returns `Ok(())` only after a shutdown signal — the loop is infinite by
/// design, so every other way out is an error.
pub async fn run(args: CliArgs) -> Result<()> {
    let channel = ChannelName::new(&args.channel);

    let shutdown = CancellationToken::new();
    shutdown::install(shutdown.clone()).context("cannot register SIGINT/SIGTERM handlers")?;

    let session = PgSession::connect(&args.dsn).await?;
    let reconnector = Reconnector::new(args.dsn.clone(), BackoffPolicy::default());

    let result = match args.program {
        Some(ref program) => {
            let sink = ProcessSink::new(program.clone(), args.args.clone(), args.max_children);
            drive(Bridge::new(session, reconnector, channel, sink, shutdown)).await
        }
        None => {
            let sink = WriterSink::stdout();
            drive(Bridge::new(session, reconnector, channel, sink, shutdown)).await
        }
    };

    match result {
        // A shutdown signal is the one designed way out of the loop.
        Err(BridgeError::Interrupted) => Ok(()),
        other => other,
    }
}

/// Runs the loop, then always tears the bridge down before reporting the
/// loop's outcome.
async fn drive<S: DispatchSink>(mut bridge: Bridge<S>) -> Result<()> {
    let result = bridge.run().await;
    debug!("bridge loop ended; cleaning up");
    bridge.close().await;
    result
}
