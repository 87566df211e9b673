// src/db/mod.rs

//! Database layer: session lifecycle, subscription, reconnection.
//!
//! - [`session`] owns the connection driver task and the notification
//!   stream, and issues the `LISTEN` command.
//! - [`channel`] holds the identifier-escaped channel name.
//! - [`backoff`] computes reconnect delays.
//! - [`reconnect`] replaces broken sessions, retrying indefinitely.

pub mod backoff;
pub mod channel;
pub mod reconnect;
pub mod session;

pub use backoff::BackoffPolicy;
pub use channel::ChannelName;
pub use reconnect::Reconnector;
pub use session::{Notification, PgSession};
