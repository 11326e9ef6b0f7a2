//! Error types for wait-for operations.
//!
//! This module defines [`WaitError`], the error type returned to callers of
//! the library, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems (bad YAML, unknown target types, unparsable target
//!   strings) abort before any target is probed
//! - Transient probe failures stay inside a single retry loop; only the final
//!   [`WaitError::TimedOut`] escapes it
//! - Use `anyhow::Error` (via `WaitError::Other`) for unexpected errors

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for wait-for operations.
#[derive(Debug, Error)]
pub enum WaitError {
    /// Configuration file not found at the given location.
    #[error("unable to open config file: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("unable to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// A duration flag or setting could not be parsed.
    #[error("unable to parse {setting}: {message}")]
    InvalidDuration { setting: String, message: String },

    /// A duration that must be positive was zero.
    #[error("{setting} must be greater than zero, got {value:?}")]
    NonPositiveDuration { setting: String, value: Duration },

    /// A duration too long to schedule a deadline with.
    #[error("{setting} is longer than the supported maximum, got {value:?}")]
    DurationTooLong { setting: String, value: Duration },

    /// A command-line target string has no recognised prefix.
    #[error("unable to understand target {target}")]
    InvalidTarget { target: String },

    /// No waiter is registered for the target's type.
    #[error("unknown target type {kind}")]
    UnknownTargetType { kind: String },

    /// A target name was requested that the configuration does not define.
    #[error("unknown target {name}")]
    UnknownTarget { name: String },

    /// A target never became ready before its deadline.
    #[error("timed out waiting for {name}: {reason}")]
    TimedOut { name: String, reason: String },

    /// A target's settings can never succeed, so it was not retried.
    #[error("cannot wait for {name}: {reason}")]
    Misconfigured { name: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for wait-for operations.
pub type Result<T> = std::result::Result<T, WaitError>;
