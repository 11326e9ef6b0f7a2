//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

const TARGET_HELP: &str = "Each TARGET is either the name of a target in the config file or one of \
tcp:HOST:PORT, http://URL, https://URL, grpc:HOST:PORT, dns:NAME";

/// wait-for - Block until network dependencies are ready.
#[derive(Debug, Parser)]
#[command(name = "wait-for")]
#[command(author, version, about, long_about = None)]
#[command(after_help = TARGET_HELP)]
pub struct Cli {
    /// Time to wait for services to become available, e.g. 30s, 1m30s or 1.5s [default: 5s]
    #[arg(short, long, value_name = "DURATION", env = "WAIT_FOR_TIMEOUT")]
    pub timeout: Option<String>,

    /// Timeout for each request made by the HTTP client [default: 1s]
    #[arg(long, alias = "http_timeout", value_name = "DURATION")]
    pub http_timeout: Option<String>,

    /// Configuration file to use
    #[arg(short, long, value_name = "PATH", env = "WAIT_FOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reduce output to the minimum
    #[arg(short, long)]
    pub quiet: bool,

    /// Regular expression the HTTP status code must match [default: 2xx]
    #[arg(long, value_name = "PATTERN")]
    pub regex: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Targets to wait for
    #[arg(value_name = "TARGET", required = true)]
    pub targets: Vec<String>,
}
