//! Protocol waiters.
//!
//! A [`Waiter`] performs one readiness probe against a [`Target`]. It never
//! retries; the [`RetryLoop`](crate::runner::RetryLoop) decides whether to
//! probe again.
//!
//! - [`tcp`] - a TCP connection can be opened
//! - [`http`] - a GET request returns an accepted status code
//! - [`grpc`] - a gRPC channel can be established
//! - [`dns`] - the resolved address set changes
//!
//! Waiters are looked up by [`TargetKind`] in a [`WaiterRegistry`], which is
//! built once at startup and handed to the orchestrator.
//!
//! # Example
//!
//! ```
//! use wait_for::config::{Target, TargetKind};
//! use wait_for::waiters::{ProbeResult, WaiterRegistry};
//!
//! let mut registry = WaiterRegistry::new();
//! registry.register(TargetKind::Tcp, |_name: &str, _target: &Target| -> ProbeResult {
//!     Ok(())
//! });
//!
//! let waiter = registry.get(TargetKind::Tcp).unwrap();
//! assert!(waiter.probe("db", &Target::new(TargetKind::Tcp, "db:5432")).is_ok());
//! assert!(registry.get(TargetKind::Dns).is_none());
//! ```

pub mod dns;
pub mod grpc;
pub mod http;
pub mod tcp;

pub use dns::{AddressSet, DnsWaiter, Resolver, SystemResolver, DEFAULT_LOOKUP_TIMEOUT};
pub use grpc::GrpcWaiter;
pub use http::HttpWaiter;
pub use tcp::TcpWaiter;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Target, TargetKind};
use crate::error::Result;
use crate::ui::WaitLogger;

/// Why a single probe did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The target is not ready yet; probing again may succeed.
    #[error("{0}")]
    Transient(String),

    /// The target's settings can never succeed; probing again is pointless.
    #[error("{0}")]
    Permanent(String),
}

impl ProbeError {
    /// Create a retryable failure.
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient(reason.into())
    }

    /// Create a non-retryable failure.
    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent(reason.into())
    }

    /// Whether probing again could change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Human readable reason.
    pub fn reason(&self) -> &str {
        match self {
            Self::Transient(r) | Self::Permanent(r) => r,
        }
    }
}

/// Outcome of a single probe.
pub type ProbeResult = std::result::Result<(), ProbeError>;

/// A single-shot readiness probe for one protocol.
pub trait Waiter: Send + Sync {
    /// Probe `target` once.
    ///
    /// `name` is the target's configured name and is used in failure reasons.
    fn probe(&self, name: &str, target: &Target) -> ProbeResult;
}

impl<F> Waiter for F
where
    F: Fn(&str, &Target) -> ProbeResult + Send + Sync,
{
    fn probe(&self, name: &str, target: &Target) -> ProbeResult {
        self(name, target)
    }
}

/// Mapping from target kind to the waiter that handles it.
#[derive(Default)]
pub struct WaiterRegistry {
    waiters: HashMap<TargetKind, Arc<dyn Waiter>>,
}

impl WaiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in waiter for every [`TargetKind`].
    ///
    /// The DNS waiter reports unchanged results through `logger`.
    pub fn standard(logger: Arc<dyn WaitLogger>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(TargetKind::Tcp, TcpWaiter);
        registry.register(TargetKind::Http, HttpWaiter::new()?);
        registry.register(TargetKind::Grpc, GrpcWaiter);
        registry.register(
            TargetKind::Dns,
            DnsWaiter::new(Arc::new(SystemResolver::new(DEFAULT_LOOKUP_TIMEOUT)?), logger),
        );
        Ok(registry)
    }

    /// Register (or replace) the waiter for `kind`.
    pub fn register<W: Waiter + 'static>(&mut self, kind: TargetKind, waiter: W) -> &mut Self {
        self.waiters.insert(kind, Arc::new(waiter));
        self
    }

    /// Look up the waiter for `kind`.
    pub fn get(&self, kind: TargetKind) -> Option<&dyn Waiter> {
        self.waiters.get(&kind).map(|w| w.as_ref())
    }

    /// Kinds with a registered waiter, sorted.
    pub fn kinds(&self) -> Vec<TargetKind> {
        let mut kinds: Vec<_> = self.waiters.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for WaiterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaiterRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NullLogger;

    fn always_ok(_: &str, _: &Target) -> ProbeResult {
        Ok(())
    }

    #[test]
    fn probe_error_classification() {
        assert!(ProbeError::transient("refused").is_retryable());
        assert!(!ProbeError::permanent("bad regex").is_retryable());
        assert_eq!(ProbeError::permanent("bad regex").reason(), "bad regex");
        assert_eq!(ProbeError::transient("refused").to_string(), "refused");
    }

    #[test]
    fn functions_are_waiters() {
        let target = Target::new(TargetKind::Tcp, "localhost:1");
        assert!(always_ok.probe("x", &target).is_ok());

        let failing =
            |name: &str, _: &Target| -> ProbeResult { Err(ProbeError::transient(format!("no {name}"))) };
        assert_eq!(
            failing.probe("x", &target),
            Err(ProbeError::Transient("no x".into()))
        );
    }

    #[test]
    fn register_replaces_existing_waiter() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, |_: &str, _: &Target| -> ProbeResult {
            Err(ProbeError::transient("first"))
        });
        registry.register(TargetKind::Tcp, always_ok);

        let target = Target::new(TargetKind::Tcp, "localhost:1");
        assert!(registry.get(TargetKind::Tcp).unwrap().probe("x", &target).is_ok());
        assert_eq!(registry.kinds(), vec![TargetKind::Tcp]);
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = WaiterRegistry::standard(Arc::new(NullLogger)).unwrap();
        assert_eq!(registry.kinds(), TargetKind::ALL.to_vec());
    }

    #[test]
    fn debug_lists_kinds() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Dns, always_ok);
        assert!(format!("{registry:?}").contains("Dns"));
    }
}
