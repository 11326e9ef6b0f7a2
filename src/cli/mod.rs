//! Command-line interface for wait-for.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`run`] - Turns parsed arguments into a wait

pub mod args;
pub mod run;

pub use args::Cli;
pub use run::RunCommand;
