//! Configuration file loading.
//!
//! Reads an optional YAML file and layers command-line defaults on top of it.

use crate::config::schema::{Config, StatusPattern, MAX_DURATION};
use crate::error::{WaitError, Result};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// A decimal number directly followed by a short unit, e.g. `1.5s` or `.25h`.
static FRACTIONAL_UNIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d*)\.(\d*)(ns|us|µs|μs|ms|s|m|h)").unwrap());

/// Defaults supplied on the command line.
///
/// Any value set here replaces the matching `default-*` setting of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `default-timeout`
    pub timeout: Option<Duration>,
    /// Replaces `default-http-timeout`
    pub http_client_timeout: Option<Duration>,
    /// Replaces `default-status-pattern`
    pub status_pattern: Option<StatusPattern>,
}

impl ConfigOverrides {
    /// Build overrides from raw flag values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDuration` if either duration string is malformed.
    pub fn from_flags(
        timeout: Option<&str>,
        http_client_timeout: Option<&str>,
        status_pattern: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            timeout: timeout.map(|t| parse_duration("timeout", t)).transpose()?,
            http_client_timeout: http_client_timeout
                .map(|t| parse_duration("http timeout", t))
                .transpose()?,
            status_pattern: status_pattern.map(StatusPattern::parse),
        })
    }

    fn apply(&self, config: &mut Config) {
        if let Some(timeout) = self.timeout {
            config.default_timeout = Some(timeout);
        }
        if let Some(timeout) = self.http_client_timeout {
            config.default_http_timeout = Some(timeout);
        }
        if let Some(pattern) = &self.status_pattern {
            config.default_status_pattern = Some(pattern.clone());
        }
    }
}

/// Parse a human readable duration such as `5s`, `250ms`, `1m30s` or `1.5s`.
///
/// `setting` names the value in the error message.
///
/// # Errors
///
/// Returns `InvalidDuration` for malformed input and `DurationTooLong` for
/// values above [`MAX_DURATION`].
pub fn parse_duration(setting: &str, value: &str) -> Result<Duration> {
    let normalized = normalize_fractions(value.trim());
    let duration =
        humantime::parse_duration(&normalized).map_err(|e| WaitError::InvalidDuration {
            setting: setting.to_string(),
            message: format!("{value:?}: {e}"),
        })?;

    if duration > MAX_DURATION {
        return Err(WaitError::DurationTooLong {
            setting: setting.to_string(),
            value: duration,
        });
    }
    Ok(duration)
}

/// Rewrite fractional components (`1.5s`) as whole nanoseconds, which
/// humantime understands.
fn normalize_fractions(value: &str) -> Cow<'_, str> {
    FRACTIONAL_UNIT.replace_all(value, |caps: &Captures<'_>| {
        fractional_nanos(&caps[1], &caps[2], &caps[3])
            .map(|nanos| format!("{nanos}ns"))
            .unwrap_or_else(|| caps[0].to_string())
    })
}

fn fractional_nanos(whole: &str, fraction: &str, unit: &str) -> Option<u128> {
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let unit: u128 = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60_000_000_000,
        _ => 3_600_000_000_000,
    };

    // Digits below one nanosecond are dropped.
    let fraction = &fraction[..fraction.len().min(18)];
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let numerator: u128 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
    let scale = 10u128.pow(fraction.len() as u32);

    whole
        .checked_mul(unit)?
        .checked_add(numerator.checked_mul(unit)? / scale)
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            WaitError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            WaitError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into a [`Config`].
///
/// An empty document yields the default configuration.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(content).map_err(|e| WaitError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Open the configuration for a run.
///
/// Without a path an empty configuration is used. Command-line overrides are
/// applied last.
pub fn open_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_file(path)?,
        None => Config::default(),
    };

    overrides.apply(&mut config);
    Ok(config)
}
