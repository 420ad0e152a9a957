//! Smoke tests for the Testify CLI.
//!
//! These tests verify basic CLI functionality:
//! - `testify --version` outputs version info
//! - `testify --help` outputs help text
//! - `testify` (no args) fails with usage

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the testify binary.
fn testify() -> Command {
    Command::new(env!("CARGO_BIN_EXE_testify"))
}

#[test]
fn test_version_flag() {
    testify()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("testify"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    testify()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("snippet"));
}

#[test]
fn test_no_args_prints_usage() {
    testify()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
