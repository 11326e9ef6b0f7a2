//! Configuration loading and target resolution for wait-for.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File loading and command-line overrides in [`loader`]
//! - Target strings and default resolution in [`targets`]
//!
//! # Example
//!
//! ```
//! use wait_for::config::{open_config, ConfigOverrides, TargetKind};
//! use std::time::Duration;
//!
//! let overrides = ConfigOverrides::from_flags(Some("30s"), None, None).unwrap();
//! let mut config = open_config(None, &overrides).unwrap();
//! config.add_from_string("tcp:localhost:5432").unwrap();
//!
//! let targets = config.select(&["tcp:localhost:5432"]).unwrap();
//! let db = &targets["tcp:localhost:5432"];
//! assert_eq!(db.kind, TargetKind::Tcp);
//! assert_eq!(db.timeout, Duration::from_secs(30));
//! ```
//!
//! # Default Resolution
//!
//! Each target field is taken from, in order:
//! 1. The target's own definition
//! 2. The command-line flag (`--timeout`, `--http-timeout`, `--regex`)
//! 3. The file's `default-*` setting
//! 4. The built-in default

pub mod loader;
pub mod schema;
pub mod targets;

// Schema re-exports
pub use schema::{
    Config, StatusPattern, Target, TargetConfig, TargetKind, DEFAULT_HTTP_CLIENT_TIMEOUT,
    DEFAULT_TIMEOUT, MAX_DURATION,
};

// Loader re-exports
pub use loader::{load_config_file, open_config, parse_config, parse_duration, ConfigOverrides};

// Target re-exports
pub use targets::parse_target_string;

#[cfg(test)]
mod tests {
    #[test]
    fn serde_yaml_parses_nested_targets() {
        let yaml = r#"
          targets:
            api:
              type: http
              target: http://localhost
        "#;
        let parsed: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed["targets"]["api"]["type"], "http");
    }
}
