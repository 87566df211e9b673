// src/exec/stdout.rs

//! Stdout delivery.

use std::future::Future;
use std::pin::Pin;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::errors::{BridgeError, Result};

use super::DispatchSink;

/// Writes payloads verbatim to an async writer, flushing after each one so
/// a piped consumer sees the payload promptly.
///
/// No delimiter is added beyond whatever the payload already contains.
pub struct WriterSink<W> {
    writer: W,
}

impl WriterSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: tokio::io::stdout(),
        }
    }
}

impl<W> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: AsyncWrite + Unpin + Send> DispatchSink for WriterSink<W> {
    fn dispatch(
        &mut self,
        payload: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.writer
                .write_all(payload.as_bytes())
                .await
                .map_err(BridgeError::Output)?;
            self.writer.flush().await.map_err(BridgeError::Output)
        })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let _ = self.writer.flush().await;
        })
    }
}
