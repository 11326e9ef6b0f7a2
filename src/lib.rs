//! wait-for - Block until network dependencies are ready.
//!
//! wait-for gates the startup of a process on its dependencies: it probes a
//! set of named targets concurrently and returns once every one of them is
//! ready, or fails as soon as all have finished and one of them timed out.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, target strings and defaults
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Retry loop and concurrent orchestration
//! - [`ui`] - Progress events and loggers
//! - [`waiters`] - TCP, HTTP, gRPC and DNS probes
//!
//! # Example
//!
//! ```
//! use std::net::TcpListener;
//! use std::sync::Arc;
//! use wait_for::config::Config;
//! use wait_for::runner::wait_on;
//! use wait_for::ui::RecordingLogger;
//! use wait_for::waiters::WaiterRegistry;
//!
//! let listener = TcpListener::bind("127.0.0.1:0").unwrap();
//! let target = format!("tcp:{}", listener.local_addr().unwrap());
//!
//! let logger = Arc::new(RecordingLogger::new());
//! let registry = WaiterRegistry::standard(logger.clone()).unwrap();
//! wait_on(&mut Config::default(), &[target.as_str()], &registry, logger.as_ref()).unwrap();
//!
//! assert!(logger.contains(&format!("finished waiting for {target}")));
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;
pub mod waiters;

pub use error::{Result, WaitError};
