// src/shutdown.rs

//! OS signal handling.
//!
//! The bridge shuts down on SIGINT and SIGTERM, nothing else. The handlers
//! never touch shared state directly: they cancel a [`CancellationToken`]
//! that the main loop polls at its await points, including mid-backoff.

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Registers SIGINT/SIGTERM listeners and spawns the watcher task that
/// cancels `token` on the first signal received.
///
/// Registration happens before the task is spawned, so a registration
/// failure surfaces here as a startup error.
#[cfg(unix)]
pub fn install(token: CancellationToken) -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
        info!("received exit signal");
        token.cancel();
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn install(token: CancellationToken) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received exit signal");
        }
        token.cancel();
    });

    Ok(())
}
