// src/exec/launcher.rs

//! Per-notification subprocess launching.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::errors::{BridgeError, Result};

use super::DispatchSink;

/// Spawns the target program once per payload.
///
/// Dispatch returns as soon as the child is spawned and its stdin handle is
/// handed to a waiter task. The waiter writes the full payload, closes
/// stdin (the child sees EOF as the payload boundary), then waits for the
/// child and logs its exit status. Waiters live in a [`JoinSet`] that is
/// reaped opportunistically on each launch and exhaustively at shutdown.
///
/// A semaphore caps how many children run at once. At the cap, dispatch
/// waits for a permit, applying backpressure to notification delivery
/// instead of exhausting the process table.
///
/// Spawn failure is the caller's problem (fatal for the whole process);
/// anything that goes wrong after a successful spawn is isolated to the
/// waiter task and only logged.
pub struct ProcessSink {
    program: String,
    args: Vec<String>,
    permits: Arc<Semaphore>,
    children: JoinSet<()>,
}

impl ProcessSink {
    pub fn new(program: impl Into<String>, args: Vec<String>, max_children: usize) -> Self {
        Self {
            program: program.into(),
            args,
            permits: Arc::new(Semaphore::new(max_children)),
            children: JoinSet::new(),
        }
    }

    /// Number of children not yet reaped.
    pub fn outstanding(&self) -> usize {
        self.children.len()
    }

    async fn launch(&mut self, payload: String) -> Result<()> {
        // Reap children that already finished before adding another.
        while let Some(reaped) = self.children.try_join_next() {
            if let Err(err) = reaped {
                warn!(error = %err, "child waiter task failed");
            }
        }

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| anyhow!("child semaphore closed"))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|source| {
                error!(program = %self.program, error = %source, "failed to spawn child");
                BridgeError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            return Err(anyhow!("spawned child has no stdin handle").into());
        };

        let program = self.program.clone();
        self.children.spawn(async move {
            let _permit = permit;
            if let Err(err) = stdin.write_all(payload.as_bytes()).await {
                error!(program = %program, error = %err, "failed to write payload to child stdin");
            }
            drop(stdin); // closes the pipe: EOF marks the payload boundary
            match child.wait().await {
                Ok(status) if status.success() => {
                    debug!(program = %program, "child exited cleanly");
                }
                Ok(status) => {
                    error!(program = %program, code = ?status.code(), "child exited with failure");
                }
                Err(err) => {
                    error!(program = %program, error = %err, "failed waiting on child");
                }
            }
        });

        Ok(())
    }

    /// Blocks until every outstanding child has been reaped. Children are
    /// waited on, not killed.
    pub async fn reap_all(&mut self) {
        while let Some(reaped) = self.children.join_next().await {
            if let Err(err) = reaped {
                warn!(error = %err, "child waiter task failed");
            }
        }
    }
}

impl DispatchSink for ProcessSink {
    fn dispatch(
        &mut self,
        payload: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(self.launch(payload))
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.reap_all())
    }
}
