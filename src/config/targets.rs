//! Target registration and default resolution.
//!
//! Command-line targets are bare strings such as `tcp:db:5432` or
//! `https://api/health`; they are added to the configuration under their own
//! text as name. [`Config::select`] then turns the requested names into fully
//! resolved [`Target`]s.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::schema::{
    Config, Target, TargetConfig, TargetKind, DEFAULT_HTTP_CLIENT_TIMEOUT, DEFAULT_TIMEOUT,
    MAX_DURATION,
};
use crate::error::{Result, WaitError};

/// Prefixes recognised in command-line target strings.
///
/// `true` means the prefix is stripped from the address; HTTP URLs are kept
/// whole, so `http:host/path` reaches the client as written.
const TARGET_PREFIXES: &[(&str, TargetKind, bool)] = &[
    ("tcp:", TargetKind::Tcp, true),
    ("http:", TargetKind::Http, false),
    ("https:", TargetKind::Http, false),
    ("grpc:", TargetKind::Grpc, true),
    ("dns:", TargetKind::Dns, true),
];

/// Parse a command-line target string into a target definition.
///
/// # Errors
///
/// Returns `InvalidTarget` when no known prefix matches or nothing follows it.
pub fn parse_target_string(target: &str) -> Result<TargetConfig> {
    for &(prefix, kind, strip) in TARGET_PREFIXES {
        let Some(rest) = target.strip_prefix(prefix) else {
            continue;
        };
        if rest.trim_start_matches('/').is_empty() {
            break;
        }
        let address = if strip { rest } else { target };
        return Ok(TargetConfig::new(kind, address));
    }

    Err(WaitError::InvalidTarget {
        target: target.to_string(),
    })
}

fn check_max(setting: String, value: Duration) -> Result<()> {
    if value > MAX_DURATION {
        return Err(WaitError::DurationTooLong { setting, value });
    }
    Ok(())
}

impl Config {
    /// Whether a target with this name is defined.
    pub fn contains_target(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Register a command-line target string under its own text.
    pub fn add_from_string(&mut self, target: &str) -> Result<()> {
        let parsed = parse_target_string(target)?;
        self.targets.insert(target.to_string(), parsed);
        Ok(())
    }

    /// Effective default timeout.
    pub fn timeout(&self) -> Duration {
        self.default_timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Effective default HTTP client timeout.
    pub fn http_client_timeout(&self) -> Duration {
        self.default_http_timeout
            .unwrap_or(DEFAULT_HTTP_CLIENT_TIMEOUT)
    }

    /// Fill a target definition's unset fields from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveDuration` if the resolved timeout is zero, and
    /// `DurationTooLong` if either timeout exceeds [`MAX_DURATION`].
    pub fn resolve(&self, name: &str, target: &TargetConfig) -> Result<Target> {
        let timeout = target.timeout.unwrap_or_else(|| self.timeout());
        if timeout.is_zero() {
            return Err(WaitError::NonPositiveDuration {
                setting: format!("timeout for {name}"),
                value: timeout,
            });
        }
        check_max(format!("timeout for {name}"), timeout)?;

        let http_client_timeout = target
            .http_client_timeout
            .unwrap_or_else(|| self.http_client_timeout());
        check_max(format!("http timeout for {name}"), http_client_timeout)?;

        Ok(Target {
            kind: target.kind,
            address: target.target.clone(),
            timeout,
            http_client_timeout,
            status_pattern: target
                .status_pattern
                .clone()
                .or_else(|| self.default_status_pattern.clone())
                .unwrap_or_default(),
        })
    }

    /// Resolve the named targets, in name order.
    ///
    /// Duplicate names collapse into one entry.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTarget` for a name the configuration does not define.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<BTreeMap<String, Target>> {
        let mut selected = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            let target = self
                .targets
                .get(name)
                .ok_or_else(|| WaitError::UnknownTarget {
                    name: name.to_string(),
                })?;
            selected.insert(name.to_string(), self.resolve(name, target)?);
        }
        Ok(selected)
    }
}
