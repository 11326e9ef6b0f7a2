//! Configuration schema definitions for wait-for.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file format, plus the resolved [`Target`] handed to the
//! runner once every default has been filled in.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::WaitError;

/// Retry deadline used when neither the target, the flags nor the file set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-request timeout for HTTP probes when nothing else sets one.
pub const DEFAULT_HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(1);

/// Longest duration accepted for any setting (about 292 years, the range
/// of a signed 64-bit nanosecond count).
pub const MAX_DURATION: Duration = Duration::from_nanos(i64::MAX as u64);

/// Root configuration structure for a wait-for YAML file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Timeout applied to targets without their own
    #[serde(with = "humantime_serde")]
    pub default_timeout: Option<Duration>,

    /// HTTP client timeout applied to targets without their own
    #[serde(with = "humantime_serde", alias = "default-http-client-timeout")]
    pub default_http_timeout: Option<Duration>,

    /// Status pattern applied to HTTP targets without their own
    pub default_status_pattern: Option<StatusPattern>,

    /// Named target definitions
    pub targets: BTreeMap<String, TargetConfig>,
}

/// A target as written in the configuration file.
///
/// Optional fields fall back to the configuration defaults when the target
/// is resolved into a [`Target`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetConfig {
    /// Protocol used to probe the target
    #[serde(rename = "type")]
    pub kind: TargetKind,

    /// Address, URL or hostname to probe
    pub target: String,

    /// How long to keep retrying
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Timeout for each individual HTTP request
    #[serde(default, with = "humantime_serde", alias = "http-timeout")]
    pub http_client_timeout: Option<Duration>,

    /// Status codes accepted as ready
    #[serde(default, alias = "regex")]
    pub status_pattern: Option<StatusPattern>,
}

impl TargetConfig {
    /// Create a target definition with every optional field unset.
    pub fn new(kind: TargetKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            timeout: None,
            http_client_timeout: None,
            status_pattern: None,
        }
    }
}

/// Protocol used to decide whether a target is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum TargetKind {
    /// A TCP connection can be established
    Tcp,
    /// A GET request answers with an accepted status code
    Http,
    /// A gRPC channel can be established
    Grpc,
    /// The resolved address set differs from the one seen at start
    Dns,
}

impl TargetKind {
    /// All supported kinds.
    pub const ALL: [TargetKind; 4] = [Self::Tcp, Self::Http, Self::Grpc, Self::Dns];

    /// Name used in configuration files and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Http => "http",
            Self::Grpc => "grpc",
            Self::Dns => "dns",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = WaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "http" | "https" => Ok(Self::Http),
            "grpc" => Ok(Self::Grpc),
            "dns" => Ok(Self::Dns),
            _ => Err(WaitError::UnknownTargetType { kind: s.to_string() }),
        }
    }
}

impl TryFrom<String> for TargetKind {
    type Error = WaitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Rule deciding whether an HTTP status code counts as ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum StatusPattern {
    /// Any code in `200..300`
    #[default]
    SuccessRange,
    /// A regular expression matched against the decimal code
    Regex(String),
}

impl StatusPattern {
    /// Sentinel pattern that selects [`StatusPattern::SuccessRange`].
    pub const SUCCESS_SENTINEL: &'static str = "200";

    /// Interpret a user supplied pattern.
    ///
    /// An empty pattern and the literal `"200"` both select the 2xx range;
    /// anything else is treated as a regular expression. The expression is
    /// not compiled here.
    pub fn parse(pattern: &str) -> Self {
        match pattern.trim() {
            "" | Self::SUCCESS_SENTINEL => Self::SuccessRange,
            other => Self::Regex(other.to_string()),
        }
    }
}

impl From<String> for StatusPattern {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl fmt::Display for StatusPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuccessRange => f.write_str("2xx"),
            Self::Regex(p) => f.write_str(p),
        }
    }
}

/// A fully resolved target, ready to be probed.
///
/// Every field is set; the runner never consults configuration defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Protocol used to probe the target.
    pub kind: TargetKind,
    /// Address, URL or hostname to probe.
    pub address: String,
    /// How long to keep retrying before giving up.
    pub timeout: Duration,
    /// Timeout for each individual HTTP request.
    pub http_client_timeout: Duration,
    /// Status codes accepted as ready (HTTP only).
    pub status_pattern: StatusPattern,
}

impl Target {
    /// Create a target using the built-in defaults.
    pub fn new(kind: TargetKind, address: impl Into<String>) -> Self {
        Self {
            kind,
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            http_client_timeout: DEFAULT_HTTP_CLIENT_TIMEOUT,
            status_pattern: StatusPattern::SuccessRange,
        }
    }

    /// Override the retry deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the per-request HTTP timeout.
    pub fn with_http_client_timeout(mut self, timeout: Duration) -> Self {
        self.http_client_timeout = timeout;
        self
    }

    /// Override the accepted status codes.
    pub fn with_status_pattern(mut self, pattern: StatusPattern) -> Self {
        self.status_pattern = pattern;
        self
    }
}
