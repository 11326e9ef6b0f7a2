//! The wait command.

use std::sync::Arc;

use crate::cli::args::Cli;
use crate::config::{open_config, ConfigOverrides};
use crate::error::Result;
use crate::runner::wait_on;
use crate::ui::WaitLogger;
use crate::waiters::WaiterRegistry;

/// Loads configuration from parsed arguments and waits on the targets.
pub struct RunCommand<'a> {
    cli: &'a Cli,
}

impl<'a> RunCommand<'a> {
    /// Create the command for parsed arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self { cli }
    }

    /// Execute the wait, reporting progress through `logger`.
    ///
    /// Configuration and timeout errors are returned; the caller maps them
    /// to an exit code.
    pub fn execute(&self, logger: Arc<dyn WaitLogger>) -> Result<()> {
        let overrides = ConfigOverrides::from_flags(
            self.cli.timeout.as_deref(),
            self.cli.http_timeout.as_deref(),
            self.cli.regex.as_deref(),
        )?;
        let mut config = open_config(self.cli.config.as_deref(), &overrides)?;
        let registry = WaiterRegistry::standard(Arc::clone(&logger))?;

        wait_on(&mut config, &self.cli.targets, &registry, logger.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WaitError;
    use crate::ui::RecordingLogger;
    use clap::Parser;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::TempDir;

    #[test]
    fn waits_on_listening_tcp_target() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let target = format!("tcp:{}", listener.local_addr().unwrap());
        let cli = Cli::parse_from(["wait-for", "--timeout", "2s", target.as_str()]);
        let logger = Arc::new(RecordingLogger::new());

        RunCommand::new(&cli).execute(logger.clone()).unwrap();

        assert!(logger.contains(&format!("finished waiting for {target}")));
    }

    #[test]
    fn uses_targets_from_config_file() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("wait-for.yaml");
        fs::write(
            &path,
            format!(
                "targets:\n  db:\n    type: tcp\n    target: {}\n    timeout: 2s\n",
                listener.local_addr().unwrap()
            ),
        )
        .unwrap();
        let cli = Cli::parse_from(["wait-for", "--config", path.to_str().unwrap(), "db"]);
        let logger = Arc::new(RecordingLogger::new());

        RunCommand::new(&cli).execute(logger.clone()).unwrap();

        assert!(logger.contains("finished waiting for db"));
    }

    #[test]
    fn bad_timeout_flag_fails_before_waiting() {
        let cli = Cli::parse_from(["wait-for", "--timeout", "soon", "tcp:localhost:1"]);
        let err = RunCommand::new(&cli)
            .execute(Arc::new(RecordingLogger::new()))
            .unwrap_err();
        assert!(matches!(err, WaitError::InvalidDuration { .. }));
    }

    #[test]
    fn oversized_timeout_fails_before_waiting() {
        let cli = Cli::parse_from(["wait-for", "--timeout", "500000000000y", "tcp:localhost:1"]);
        let err = RunCommand::new(&cli)
            .execute(Arc::new(RecordingLogger::new()))
            .unwrap_err();
        assert!(matches!(err, WaitError::DurationTooLong { .. }));
    }

    #[test]
    fn unknown_target_prefix_fails() {
        let cli = Cli::parse_from(["wait-for", "udp:localhost:53"]);
        let err = RunCommand::new(&cli)
            .execute(Arc::new(RecordingLogger::new()))
            .unwrap_err();
        assert_eq!(err.to_string(), "unable to understand target udp:localhost:53");
    }
}
