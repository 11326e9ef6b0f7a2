//! Progress reporting for waits.
//!
//! This module provides:
//! - [`WaitEvent`], one line of progress emitted by the runner
//! - [`WaitLogger`] trait so the output sink can be swapped in tests
//! - [`TracingLogger`] for normal runs and [`NullLogger`] for `--quiet`
//!
//! Loggers are shared by every per-target worker thread, so implementations
//! must be `Send + Sync`.
//!
//! # Example
//!
//! ```
//! use wait_for::ui::{RecordingLogger, WaitEvent, WaitLogger};
//!
//! let logger = RecordingLogger::new();
//! logger.log(&WaitEvent::Finished { name: "db" });
//! assert_eq!(logger.lines(), vec!["finished waiting for db".to_string()]);
//! ```

pub mod mock;

pub use mock::RecordingLogger;

use std::fmt;
use std::sync::Arc;

/// Progress events emitted while waiting on targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitEvent<'a> {
    /// A worker has started on a target.
    Started { name: &'a str },
    /// A probe failed and will be retried.
    Retrying { name: &'a str, reason: &'a str },
    /// The target is ready.
    Finished { name: &'a str },
    /// The DNS waiter observed an unchanged address set.
    DnsResult { name: &'a str, addresses: &'a str },
}

impl WaitEvent<'_> {
    /// Name of the target the event is about.
    pub fn target(&self) -> &str {
        match self {
            Self::Started { name }
            | Self::Retrying { name, .. }
            | Self::Finished { name }
            | Self::DnsResult { name, .. } => name,
        }
    }
}

impl fmt::Display for WaitEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { name } => write!(f, "started waiting for {name}"),
            Self::Retrying { name, reason } => {
                write!(f, "error while waiting for {name}: {reason}")
            }
            Self::Finished { name } => write!(f, "finished waiting for {name}"),
            Self::DnsResult { addresses, .. } => write!(f, "got DNS result {addresses}"),
        }
    }
}

/// Sink for [`WaitEvent`]s.
///
/// Called concurrently from every worker thread.
pub trait WaitLogger: Send + Sync {
    /// Record one event.
    fn log(&self, event: &WaitEvent<'_>);
}

/// Logger that emits events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl WaitLogger for TracingLogger {
    fn log(&self, event: &WaitEvent<'_>) {
        match event {
            WaitEvent::Retrying { .. } => tracing::warn!(target_name = event.target(), "{event}"),
            _ => tracing::info!(target_name = event.target(), "{event}"),
        }
    }
}

/// Logger that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl WaitLogger for NullLogger {
    fn log(&self, _event: &WaitEvent<'_>) {}
}

/// Pick the logger for a run.
pub fn create_logger(quiet: bool) -> Arc<dyn WaitLogger> {
    if quiet {
        Arc::new(NullLogger)
    } else {
        Arc::new(TracingLogger)
    }
}
