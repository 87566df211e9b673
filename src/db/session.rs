// src/db/session.rs

//! Database session: connection driver and notification stream.

use futures_util::StreamExt;
use futures_util::stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_postgres::{AsyncMessage, Client, NoTls};
use tracing::{debug, warn};

use crate::db::ChannelName;
use crate::errors::{BridgeError, Result};

/// A notification received on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
}

/// A live database session.
///
/// Owns the `tokio_postgres` client plus the driver task that pumps the
/// connection and forwards incoming notifications into an in-process
/// channel. A session is never repaired in place: when it breaks, the
/// reconnect path replaces it wholesale.
#[derive(Debug)]
pub struct PgSession {
    client: Client,
    notifications: mpsc::UnboundedReceiver<Notification>,
    driver: JoinHandle<()>,
    broken: bool,
}

impl PgSession {
    /// Establishes a new session.
    ///
    /// A failure here is surfaced to the caller; whether to retry is the
    /// caller's concern (startup does not retry, the reconnector does).
    pub async fn connect(dsn: &str) -> Result<Self> {
        let (client, mut connection) = tokio_postgres::connect(dsn, NoTls)
            .await
            .map_err(BridgeError::Connect)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(async move {
            let messages = stream::poll_fn(move |cx| connection.poll_message(cx));
            let mut messages = std::pin::pin!(messages);
            while let Some(message) = messages.next().await {
                match message {
                    Ok(AsyncMessage::Notification(note)) => {
                        let note = Notification {
                            channel: note.channel().to_owned(),
                            payload: note.payload().to_owned(),
                        };
                        if tx.send(note).is_err() {
                            // Receiver side is gone; the session was dropped.
                            break;
                        }
                    }
                    Ok(AsyncMessage::Notice(notice)) => {
                        debug!(notice = %notice.message(), "server notice");
                    }
                    Ok(_) => {}
                    Err(err) => {
                        warn!(error = %err, "database connection error");
                        break;
                    }
                }
            }
            // Dropping `tx` here closes the notification stream, which the
            // event loop observes as a broken session.
        });

        Ok(Self {
            client,
            notifications: rx,
            driver,
            broken: false,
        })
    }

    /// Issues `LISTEN` for the channel.
    ///
    /// Must run once per session before the first wait, and again on every
    /// replacement session: subscriptions do not survive reconnects.
    pub async fn listen(&self, channel: &ChannelName) -> Result<()> {
        let command = format!("LISTEN {}", channel.quoted());
        self.client
            .batch_execute(&command)
            .await
            .map_err(BridgeError::Listen)
    }

    /// Whether the session is still usable.
    pub fn is_healthy(&self) -> bool {
        !self.broken && !self.client.is_closed() && !self.driver.is_finished()
    }

    /// Marks the session broken after its notification stream ended.
    pub fn mark_broken(&mut self) {
        self.broken = true;
    }

    /// Blocks until a notification arrives, then drains everything already
    /// queued, in arrival order. `None` means the stream ended and the
    /// session is no longer usable.
    pub async fn wait_and_drain(&mut self) -> Option<Vec<Notification>> {
        wait_and_drain(&mut self.notifications).await
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Channel-level wait/drain, split out so the batching semantics are
/// testable without a live server.
///
/// Draining continues until the queue is momentarily empty; later
/// notifications wake the next call. Nothing is ever produced twice.
pub async fn wait_and_drain(
    rx: &mut mpsc::UnboundedReceiver<Notification>,
) -> Option<Vec<Notification>> {
    let first = rx.recv().await?;
    let mut batch = vec![first];
    while let Ok(next) = rx.try_recv() {
        batch.push(next);
    }
    Some(batch)
}
