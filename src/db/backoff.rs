// src/db/backoff.rs

//! Reconnect backoff policy.
//!
//! The delay for attempt `n` (0-indexed) is: immediate for the first
//! attempt, then [`BackoffPolicy::first`] doubling per attempt with no
//! configured ceiling. A database outage therefore backs the daemon off
//! further and further without ever giving up. The computation saturates
//! instead of overflowing for absurd attempt counts.

use std::time::Duration;

/// Delay schedule for reconnect attempts.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the second attempt; doubles from there.
    pub first: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        match attempt.checked_sub(1) {
            None => Duration::ZERO,
            Some(doublings) => {
                let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
                self.first.saturating_mul(factor)
            }
        }
    }
}
