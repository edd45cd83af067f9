//! Hard deadline covering a whole exchange.
//!
//! The guard is a plain value: dropping it, or the future it runs, cancels
//! the deadline, so nothing fires after the exchange has finished.

use crate::error::GetError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Deadline armed once per exchange.
#[derive(Debug)]
pub struct TimeoutGuard {
    armed_at: Instant,
    deadline: Instant,
    limit: Duration,
}

impl TimeoutGuard {
    /// Starts the clock; the deadline is `limit` from now.
    #[must_use]
    pub fn arm(limit: Duration) -> Self {
        let armed_at = Instant::now();
        Self {
            armed_at,
            deadline: armed_at + limit,
            limit,
        }
    }

    /// Runs `future` until it completes or the deadline passes.
    ///
    /// On expiry the future is dropped, which releases whatever it owns.
    pub async fn run<F, T>(&self, future: F) -> Result<T, GetError>
    where
        F: Future<Output = Result<T, GetError>>,
    {
        timeout_at(self.deadline, future)
            .await
            .map_err(|_| GetError::Timeout { limit: self.limit })?
    }

    /// Time left before the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    #[must_use]
    pub const fn limit(&self) -> Duration {
        self.limit
    }

    /// Cancels the deadline and reports how long the guarded region took.
    #[must_use]
    pub fn disarm(self) -> Duration {
        self.armed_at.elapsed()
    }
}
