//! Recording logger for testing.
//!
//! `RecordingLogger` implements the `WaitLogger` trait and captures every
//! rendered line for later assertion. It is safe to share across the
//! orchestrator's worker threads.

use std::sync::{Mutex, PoisonError};

use super::{WaitEvent, WaitLogger};

/// Logger that keeps every line it receives.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, in the order they were logged.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of captured lines equal to `line`.
    pub fn count(&self, line: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.as_str() == line)
            .count()
    }

    /// Number of captured lines starting with `prefix`.
    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.starts_with(prefix))
            .count()
    }

    /// Whether any captured line equals `line`.
    pub fn contains(&self, line: &str) -> bool {
        self.count(line) > 0
    }
}

impl WaitLogger for RecordingLogger {
    fn log(&self, event: &WaitEvent<'_>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.to_string());
    }
}
