//! DNS change waiter.
//!
//! Unlike the other waiters this one polls internally: it records the
//! address set a name resolves to when the probe starts, then resolves again
//! once per interval until the set differs or the target's timeout elapses.
//! It is meant for cutovers where a consumer waits for a name to be
//! repointed.
//!
//! Sets are compared after sorting by each address's string form, so the
//! same addresses in a different order are not a change. Resolver errors
//! count as an empty set; an outage therefore looks like a change away from
//! a non-empty initial set. A lookup that runs out of time yields no answer
//! at all and is never a change.

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tokio::runtime::Runtime;

use crate::config::Target;
use crate::ui::{WaitEvent, WaitLogger};

use super::{ProbeError, ProbeResult, Waiter};

/// Delay between two lookups of the same name.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on a single system lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of DNS answers.
pub trait Resolver: Send + Sync {
    /// Resolve `host` to its current addresses, giving up after `timeout`.
    ///
    /// Running out of time is reported as [`io::ErrorKind::TimedOut`].
    fn lookup(&self, host: &str, timeout: Duration) -> io::Result<Vec<IpAddr>>;
}

/// Resolver backed by the operating system.
///
/// Lookups go through `tokio::net::lookup_host` on a runtime owned by the
/// resolver, bounded by the smaller of `lookup_timeout` and the caller's
/// remaining time.
#[derive(Debug)]
pub struct SystemResolver {
    lookup_timeout: Duration,
    runtime: Option<Runtime>,
}

impl SystemResolver {
    /// Create a resolver with a per-lookup timeout.
    pub fn new(lookup_timeout: Duration) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            lookup_timeout,
            runtime: Some(runtime),
        })
    }
}

impl Drop for SystemResolver {
    fn drop(&mut self) {
        // A lookup stuck in the system resolver must not block shutdown.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Append port 0 when `host` does not carry one, as `lookup_host` needs it.
fn lookup_key(host: &str) -> String {
    let has_port = match host.rsplit_once(':') {
        Some((h, port)) => {
            !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (!h.contains(':') || h.starts_with('['))
        }
        None => false,
    };

    if has_port {
        host.to_string()
    } else if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:0")
    } else {
        format!("{host}:0")
    }
}

fn lookup_timed_out(host: &str, bound: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("lookup of {host} did not finish within {bound:?}"),
    )
}

impl Resolver for SystemResolver {
    fn lookup(&self, host: &str, timeout: Duration) -> io::Result<Vec<IpAddr>> {
        let bound = self.lookup_timeout.min(timeout);
        if bound.is_zero() {
            return Err(lookup_timed_out(host, bound));
        }
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| io::Error::other("resolver runtime is shut down"))?;

        let key = lookup_key(host);
        runtime.block_on(async {
            match tokio::time::timeout(bound, tokio::net::lookup_host(key)).await {
                Ok(Ok(addrs)) => Ok(addrs.map(|a| a.ip()).collect()),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(lookup_timed_out(host, bound)),
            }
        })
    }
}

/// Addresses a name resolved to at one point in time.
///
/// Equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct AddressSet {
    addresses: Vec<IpAddr>,
}

impl AddressSet {
    /// Wrap a lookup result.
    pub fn new(addresses: Vec<IpAddr>) -> Self {
        Self { addresses }
    }

    /// Number of addresses, duplicates included.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the lookup produced nothing.
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Addresses in canonical order: sorted by their string form.
    pub fn canonical(&self) -> Vec<String> {
        let mut rendered: Vec<String> = self.addresses.iter().map(IpAddr::to_string).collect();
        rendered.sort();
        rendered
    }
}

impl PartialEq for AddressSet {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for AddressSet {}

impl From<Vec<IpAddr>> for AddressSet {
    fn from(addresses: Vec<IpAddr>) -> Self {
        Self::new(addresses)
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical().join(","))
    }
}

/// Ready once the target name resolves to a different address set than it
/// did when the probe started.
pub struct DnsWaiter {
    resolver: Arc<dyn Resolver>,
    logger: Arc<dyn WaitLogger>,
    interval: Duration,
}

impl DnsWaiter {
    /// Create a waiter polling once per [`DEFAULT_POLL_INTERVAL`].
    pub fn new(resolver: Arc<dyn Resolver>, logger: Arc<dyn WaitLogger>) -> Self {
        Self {
            resolver,
            logger,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Change the delay between lookups.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Look `host` up once. `None` means the lookup ran out of time.
    fn resolve(&self, host: &str, timeout: Duration) -> Option<AddressSet> {
        match self.resolver.lookup(host, timeout) {
            Ok(addresses) => Some(AddressSet::new(addresses)),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                tracing::debug!(host, error = %e, "DNS lookup timed out, no answer");
                None
            }
            Err(e) => {
                tracing::debug!(host, error = %e, "DNS lookup failed, treating as empty");
                Some(AddressSet::default())
            }
        }
    }
}

impl fmt::Debug for DnsWaiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DnsWaiter")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl Waiter for DnsWaiter {
    fn probe(&self, name: &str, target: &Target) -> ProbeResult {
        let start = Instant::now();
        let remaining = || target.timeout.saturating_sub(start.elapsed());

        let initial = self
            .resolve(&target.address, target.timeout)
            .unwrap_or_default();
        let mut last = initial.clone();

        loop {
            let left = remaining();
            if left.is_zero() {
                break;
            }
            let rendered = last.to_string();
            self.logger.log(&WaitEvent::DnsResult {
                name,
                addresses: &rendered,
            });
            thread::sleep(self.interval.min(left));

            let left = remaining();
            if left.is_zero() {
                break;
            }
            if let Some(current) = self.resolve(&target.address, left) {
                if current != initial {
                    return Ok(());
                }
                last = current;
            }
        }

        Err(ProbeError::transient(format!(
            "timed out waiting for DNS update to {name}"
        )))
    }
}
