//! Concurrent wait across many targets.

use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::config::Target;
use crate::error::{Result, WaitError};
use crate::ui::{WaitEvent, WaitLogger};
use crate::waiters::{Waiter, WaiterRegistry};

use super::retry::RetryLoop;

/// Runs one retry loop per target, each on its own thread.
///
/// The wait succeeds only if every target becomes ready. Workers are never
/// cancelled: when one fails the others still run to completion, and the
/// first error reported is returned once all of them have finished.
pub struct Orchestrator<'a> {
    registry: &'a WaiterRegistry,
    logger: &'a dyn WaitLogger,
    retry: RetryLoop,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator using the default retry interval.
    pub fn new(registry: &'a WaiterRegistry, logger: &'a dyn WaitLogger) -> Self {
        Self {
            registry,
            logger,
            retry: RetryLoop::default(),
        }
    }

    /// Use a custom retry loop for every target.
    pub fn with_retry(mut self, retry: RetryLoop) -> Self {
        self.retry = retry;
        self
    }

    /// Wait until every target is ready.
    ///
    /// Every target is matched to a waiter before anything starts, so an
    /// unsupported kind fails at once with `unknown target type <kind>`.
    pub fn wait_all(&self, targets: &BTreeMap<String, Target>) -> Result<()> {
        let jobs = targets
            .iter()
            .map(|(name, target)| {
                let waiter = self.registry.get(target.kind).ok_or_else(|| {
                    WaitError::UnknownTargetType {
                        kind: target.kind.to_string(),
                    }
                })?;
                Ok((name.as_str(), target, waiter))
            })
            .collect::<Result<Vec<(&str, &Target, &dyn Waiter)>>>()?;

        debug!(targets = jobs.len(), "starting waiters");

        let (tx, rx) = mpsc::channel();
        thread::scope(|scope| {
            for (name, target, waiter) in jobs {
                let tx = tx.clone();
                scope.spawn(move || {
                    self.logger.log(&WaitEvent::Started { name });
                    let result = self.retry.run(name, target, waiter, self.logger);
                    let _ = tx.send(result);
                });
            }
        });
        drop(tx);

        match rx.into_iter().find_map(|result| result.err()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetKind;
    use crate::ui::{NullLogger, RecordingLogger};
    use crate::waiters::{ProbeError, ProbeResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn fast() -> RetryLoop {
        RetryLoop::new(Duration::from_millis(20))
    }

    fn target(kind: TargetKind, timeout: Duration) -> Target {
        Target::new(kind, "somewhere").with_timeout(timeout)
    }

    fn succeed(_: &str, _: &Target) -> ProbeResult {
        Ok(())
    }

    fn fail(_: &str, _: &Target) -> ProbeResult {
        Err(ProbeError::transient("an error"))
    }

    #[test]
    fn all_succeeding_targets_finish_once_each() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, succeed);
        registry.register(TargetKind::Http, succeed);
        let logger = RecordingLogger::new();

        let targets: BTreeMap<_, _> = (0..8)
            .map(|i| {
                let kind = if i % 2 == 0 { TargetKind::Tcp } else { TargetKind::Http };
                (format!("t{i}"), target(kind, Duration::from_secs(2)))
            })
            .collect();

        Orchestrator::new(&registry, &logger)
            .with_retry(fast())
            .wait_all(&targets)
            .unwrap();

        for name in targets.keys() {
            assert_eq!(logger.count(&format!("started waiting for {name}")), 1);
            assert_eq!(logger.count(&format!("finished waiting for {name}")), 1);
        }
    }

    #[test]
    fn selects_waiter_by_kind() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, succeed);
        registry.register(TargetKind::Http, fail);

        let targets = BTreeMap::from([(
            "type 1".to_string(),
            target(TargetKind::Tcp, Duration::from_secs(1)),
        )]);

        Orchestrator::new(&registry, &NullLogger)
            .with_retry(fast())
            .wait_all(&targets)
            .unwrap();
    }

    #[test]
    fn failing_target_is_named_in_error() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, succeed);
        registry.register(TargetKind::Http, fail);

        let targets = BTreeMap::from([
            (
                "type 1".to_string(),
                target(TargetKind::Tcp, Duration::from_millis(100)),
            ),
            (
                "type 2".to_string(),
                target(TargetKind::Http, Duration::from_millis(100)),
            ),
        ]);

        let err = Orchestrator::new(&registry, &NullLogger)
            .with_retry(fast())
            .wait_all(&targets)
            .unwrap_err();

        assert_eq!(err.to_string(), "timed out waiting for type 2: an error");
    }

    #[test]
    fn some_timeout_is_reported_when_several_fail() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, fail);

        let targets = BTreeMap::from([
            ("a".to_string(), target(TargetKind::Tcp, Duration::from_millis(50))),
            ("b".to_string(), target(TargetKind::Tcp, Duration::from_millis(80))),
        ]);

        let err = Orchestrator::new(&registry, &NullLogger)
            .with_retry(fast())
            .wait_all(&targets)
            .unwrap_err();

        assert!(matches!(err, WaitError::TimedOut { .. }));
    }

    #[test]
    fn unknown_type_fails_without_probing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, move |_: &str, _: &Target| -> ProbeResult {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(ProbeError::transient("never ready"))
        });

        let targets = BTreeMap::from([
            ("db".to_string(), target(TargetKind::Tcp, Duration::from_secs(30))),
            ("names".to_string(), target(TargetKind::Dns, Duration::from_secs(30))),
        ]);
        let started = Instant::now();

        let err = Orchestrator::new(&registry, &NullLogger)
            .wait_all(&targets)
            .unwrap_err();

        assert_eq!(err.to_string(), "unknown target type dns");
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn targets_run_concurrently() {
        let mut registry = WaiterRegistry::new();
        registry.register(TargetKind::Tcp, |_: &str, _: &Target| -> ProbeResult {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        });

        let targets: BTreeMap<_, _> = (0..5)
            .map(|i| (format!("slow{i}"), target(TargetKind::Tcp, Duration::from_secs(5))))
            .collect();
        let started = Instant::now();

        Orchestrator::new(&registry, &NullLogger)
            .wait_all(&targets)
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(1200));
    }

    #[test]
    fn empty_target_set_succeeds() {
        let registry = WaiterRegistry::new();
        Orchestrator::new(&registry, &NullLogger)
            .wait_all(&BTreeMap::new())
            .unwrap();
    }
}
