// src/db/reconnect.rs

//! Connection recovery.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::db::{BackoffPolicy, PgSession};
use crate::errors::{BridgeError, Result};

/// Re-establishes broken sessions.
///
/// Retries indefinitely: a database outage stalls notification delivery but
/// never crashes the process. Only a shutdown signal interrupts the loop,
/// and it is honored even in the middle of a backoff sleep.
pub struct Reconnector {
    dsn: String,
    policy: BackoffPolicy,
}

impl Reconnector {
    pub fn new(dsn: impl Into<String>, policy: BackoffPolicy) -> Self {
        Self {
            dsn: dsn.into(),
            policy,
        }
    }

    /// No-op on a healthy session; otherwise replaces it with a fresh one,
    /// returning `true` so the caller knows to re-issue `LISTEN`.
    pub async fn ensure_connected(
        &self,
        session: &mut PgSession,
        shutdown: &CancellationToken,
    ) -> Result<bool> {
        if session.is_healthy() {
            return Ok(false);
        }
        *session = self.reconnect(shutdown).await?;
        Ok(true)
    }

    /// The retry loop itself. The first attempt is immediate; each later
    /// attempt sleeps the current backoff delay first.
    pub async fn reconnect(&self, shutdown: &CancellationToken) -> Result<PgSession> {
        info!("reconnecting to database");

        let mut attempt: u32 = 0;
        loop {
            let delay = self.policy.delay(attempt);
            if !delay.is_zero() {
                warn!(
                    delay_secs = delay.as_secs(),
                    "connection failed; sleeping before retry"
                );
                tokio::select! {
                    _ = shutdown.cancelled() => return Err(BridgeError::Interrupted),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            match PgSession::connect(&self.dsn).await {
                Ok(session) => {
                    info!("database connection re-established");
                    return Ok(session);
                }
                Err(err) => {
                    warn!(error = %err, attempt, "reconnect attempt failed");
                    attempt += 1;
                }
            }

            if shutdown.is_cancelled() {
                return Err(BridgeError::Interrupted);
            }
        }
    }
}
