//! Integration tests for the wait-for binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use tempfile::TempDir;

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn wait_for() -> Command {
    let mut cmd = Command::new(cargo_bin("wait-for"));
    cmd.env_remove("WAIT_FOR_TIMEOUT")
        .env_remove("WAIT_FOR_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    wait_for()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Block until network dependencies"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    wait_for()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_a_target() -> Result<(), Box<dyn std::error::Error>> {
    wait_for().assert().failure();
    Ok(())
}

#[test]
fn cli_succeeds_for_listening_tcp_target() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let target = format!("tcp:{}", listener.local_addr()?);

    wait_for()
        .args(["--timeout", "2s", &target])
        .assert()
        .success()
        .stderr(predicate::str::contains(format!(
            "finished waiting for {target}"
        )));
    Ok(())
}

#[test]
fn cli_quiet_suppresses_progress() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let target = format!("tcp:{}", listener.local_addr()?);

    wait_for()
        .args(["--quiet", &target])
        .assert()
        .success()
        .stderr(predicate::str::contains("finished waiting").not());
    Ok(())
}

#[test]
fn cli_fails_when_target_never_ready() -> Result<(), Box<dyn std::error::Error>> {
    let target = format!("tcp:127.0.0.1:{}", closed_port());

    wait_for()
        .args(["--timeout", "1s", &target])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!(
            "timed out waiting for {target}"
        )));
    Ok(())
}

#[test]
fn cli_rejects_unknown_target_prefix() -> Result<(), Box<dyn std::error::Error>> {
    wait_for()
        .arg("udp:localhost:53")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "unable to understand target udp:localhost:53",
        ));
    Ok(())
}

#[test]
fn cli_rejects_invalid_timeout() -> Result<(), Box<dyn std::error::Error>> {
    wait_for()
        .args(["--timeout", "invalid duration", "tcp:localhost:1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unable to parse timeout"));
    Ok(())
}

#[test]
fn cli_rejects_oversized_timeout() -> Result<(), Box<dyn std::error::Error>> {
    wait_for()
        .args(["--timeout", "500000000000y", "tcp:localhost:1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "timeout is longer than the supported maximum",
        ));
    Ok(())
}

#[test]
fn cli_accepts_fractional_timeout() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let target = format!("tcp:{}", listener.local_addr()?);

    wait_for()
        .args(["--timeout", "1.5s", &target])
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_reports_missing_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = temp.path().join("absent.yaml");

    wait_for()
        .arg("--config")
        .arg(&path)
        .arg("db")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unable to open config file"));
    Ok(())
}

#[test]
fn cli_waits_on_named_config_targets() -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let temp = TempDir::new()?;
    let path = temp.path().join("wait-for.yaml");
    fs::write(
        &path,
        format!(
            r#"
default-timeout: 2s
targets:
  database:
    type: tcp
    target: {}
  unused:
    type: tcp
    target: 127.0.0.1:{}
"#,
            listener.local_addr()?,
            closed_port()
        ),
    )?;

    wait_for()
        .arg("--config")
        .arg(&path)
        .arg("database")
        .assert()
        .success()
        .stderr(predicate::str::contains("finished waiting for database"))
        .stderr(predicate::str::contains("unused").not());
    Ok(())
}

#[test]
fn cli_rejects_unknown_type_in_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let path = temp.path().join("wait-for.yaml");
    fs::write(
        &path,
        "targets:\n  weird:\n    type: udp\n    target: localhost:53\n",
    )?;

    wait_for()
        .arg("--config")
        .arg(&path)
        .arg("weird")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown target type udp"));
    Ok(())
}
