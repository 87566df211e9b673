// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

/// Failure classes of the notification bridge.
///
/// Everything here is fatal once it reaches the top-level handler, except
/// [`BridgeError::Interrupted`], which maps to a clean exit. Transient
/// connection loss never shows up as an error at all; the reconnect loop
/// absorbs it.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Establishing a database session failed.
    #[error("database connection failed: {0}")]
    Connect(#[source] tokio_postgres::Error),

    /// The LISTEN command was rejected by the server.
    #[error("LISTEN command failed: {0}")]
    Listen(#[source] tokio_postgres::Error),

    /// Spawning the target program failed (missing executable, resource
    /// exhaustion). Failures after a successful spawn are not errors here;
    /// the child's waiter task logs them and the loop continues.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a payload to standard output failed.
    #[error("writing payload to stdout failed: {0}")]
    Output(#[source] std::io::Error),

    /// A termination signal was received.
    #[error("interrupted by shutdown signal")]
    Interrupted,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
