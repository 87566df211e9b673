// src/exec/mod.rs

//! Notification delivery backends.
//!
//! The bridge loop talks to a [`DispatchSink`] instead of a concrete
//! destination. This makes it easy to swap in a recording fake in tests
//! while keeping the production sinks here:
//!
//! - [`WriterSink`] writes payloads verbatim to stdout (or any async
//!   writer).
//! - [`ProcessSink`] spawns the target program once per payload and feeds
//!   the payload to the child's stdin.

pub mod launcher;
pub mod stdout;

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;

/// Where drained notification payloads go.
pub trait DispatchSink: Send {
    /// Deliver one payload.
    ///
    /// For the process sink this returns once the child is spawned and
    /// handed off, not when it finishes; dispatch latency stays independent
    /// of child runtime.
    fn dispatch(&mut self, payload: String)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Release the sink: flush buffered output, reap outstanding children.
    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

pub use launcher::ProcessSink;
pub use stdout::WriterSink;
