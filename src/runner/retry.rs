//! Per-target retry loop.

use std::thread;
use std::time::{Duration, Instant};

use crate::config::Target;
use crate::error::{Result, WaitError};
use crate::ui::{WaitEvent, WaitLogger};
use crate::waiters::{ProbeError, Waiter};

/// Delay between two probes of the same target.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Probes one target until it is ready or its timeout elapses.
#[derive(Debug, Clone, Copy)]
pub struct RetryLoop {
    interval: Duration,
}

impl Default for RetryLoop {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryLoop {
    /// Create a loop sleeping `interval` between failed probes.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Delay between probes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `waiter` against `target` until it succeeds or time runs out.
    ///
    /// The deadline is `target.timeout` from the call. Each retryable failure
    /// seen before the deadline is logged and followed by a sleep; the first
    /// failure at or after the deadline ends the loop with
    /// [`WaitError::TimedOut`]. A permanent failure ends it at once with
    /// [`WaitError::Misconfigured`]. A timeout too large to add to the
    /// current instant means the loop has no deadline.
    pub fn run(
        &self,
        name: &str,
        target: &Target,
        waiter: &dyn Waiter,
        logger: &dyn WaitLogger,
    ) -> Result<()> {
        let deadline = Instant::now().checked_add(target.timeout);

        loop {
            let reason = match waiter.probe(name, target) {
                Ok(()) => {
                    logger.log(&WaitEvent::Finished { name });
                    return Ok(());
                }
                Err(ProbeError::Permanent(reason)) => {
                    return Err(WaitError::Misconfigured {
                        name: name.to_string(),
                        reason,
                    });
                }
                Err(ProbeError::Transient(reason)) => reason,
            };

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(WaitError::TimedOut {
                    name: name.to_string(),
                    reason,
                });
            }

            logger.log(&WaitEvent::Retrying {
                name,
                reason: &reason,
            });
            thread::sleep(self.interval);
        }
    }
}
