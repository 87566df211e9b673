// src/bridge.rs

//! The resilient notification loop.
//!
//! One iteration: make sure the session is healthy (reconnecting with
//! backoff if not, then re-issuing `LISTEN`), block until notifications
//! arrive, drain everything queued, dispatch the batch strictly in arrival
//! order. The loop only ends on a fatal error or a shutdown signal; a
//! broken connection just routes it back through the reconnect path.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::db::{ChannelName, PgSession, Reconnector};
use crate::errors::{BridgeError, Result};
use crate::exec::DispatchSink;

/// The bridge context: the one live session, the immutable channel name,
/// and the sink notifications are delivered to.
pub struct Bridge<S> {
    session: PgSession,
    reconnector: Reconnector,
    channel: ChannelName,
    sink: S,
    shutdown: CancellationToken,
}

impl<S: DispatchSink> Bridge<S> {
    pub fn new(
        session: PgSession,
        reconnector: Reconnector,
        channel: ChannelName,
        sink: S,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            session,
            reconnector,
            channel,
            sink,
            shutdown,
        }
    }

    /// Runs until a fatal error or shutdown.
    ///
    /// Returns [`BridgeError::Interrupted`] on shutdown; the top-level
    /// handler maps that to a clean exit after cleanup. There is no
    /// successful return: the loop is infinite by design.
    pub async fn run(&mut self) -> Result<()> {
        self.session.listen(&self.channel).await?;
        info!(channel = %self.channel, "listening on channel");

        loop {
            if self
                .reconnector
                .ensure_connected(&mut self.session, &self.shutdown)
                .await?
            {
                // A replacement session has no subscriptions; re-issue
                // LISTEN before waiting again.
                self.session.listen(&self.channel).await?;
                info!(channel = %self.channel, "listening on channel");
            }

            let batch = tokio::select! {
                _ = self.shutdown.cancelled() => return Err(BridgeError::Interrupted),
                batch = self.session.wait_and_drain() => batch,
            };

            match batch {
                None => {
                    // Notification stream ended: the connection is gone.
                    // Next iteration enters the reconnect path. Anything
                    // published while we are away is lost (at-most-once).
                    self.session.mark_broken();
                }
                Some(batch) => {
                    debug!(count = batch.len(), "drained notification batch");
                    for note in batch {
                        self.sink.dispatch(note.payload).await?;
                    }
                }
            }
        }
    }

    /// Tears the bridge down: reaps outstanding children / flushes output,
    /// then drops the session. Runs whatever `run` returned.
    pub async fn close(mut self) {
        self.sink.shutdown().await;
    }
}
