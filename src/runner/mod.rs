//! Wait execution: per-target retry loops run concurrently.

pub mod orchestrator;
pub mod retry;

pub use orchestrator::Orchestrator;
pub use retry::{RetryLoop, DEFAULT_RETRY_INTERVAL};

use crate::config::Config;
use crate::error::Result;
use crate::ui::WaitLogger;
use crate::waiters::WaiterRegistry;

/// Wait for the named targets to become ready.
///
/// Names the configuration does not define are parsed as target strings
/// (`tcp:host:port`, `http://...`, `dns:name`, ...) and added to it first.
/// Only the named targets are waited on.
pub fn wait_on<S: AsRef<str>>(
    config: &mut Config,
    names: &[S],
    registry: &WaiterRegistry,
    logger: &dyn WaitLogger,
) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if !config.contains_target(name) {
            config.add_from_string(name)?;
        }
    }

    let targets = config.select(names)?;
    Orchestrator::new(registry, logger).wait_all(&targets)
}
