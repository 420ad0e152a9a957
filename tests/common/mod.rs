//! Common test utilities for Testify integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read or
//! write the user's `~/.config/testify/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;
pub use tempfile::TempDir;

/// A test environment with isolated configuration.
///
/// Each `TestEnv` creates two temporary directories:
/// - `project_dir`: Working directory, where `testify.kdl` lives
/// - `config_dir`: System config directory (via `TESTIFY_CONFIG_DIR`)
///
/// The `testify()` method returns a `Command` that sets the directories
/// per-invocation and clears the override variables, making tests
/// parallel-safe.
pub struct TestEnv {
    pub project_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            project_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the testify binary inside this environment.
    pub fn testify(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_testify"));
        cmd.current_dir(self.project_dir.path());
        cmd.env("TESTIFY_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("TESTIFY_EMBED_BASE_URL");
        cmd.env_remove("TESTIFY_RESIZER_URL");
        cmd.env_remove("TESTIFY_LOG");
        cmd
    }

    pub fn project_path(&self) -> &Path {
        self.project_dir.path()
    }

    pub fn config_path(&self) -> &Path {
        self.config_dir.path()
    }

    /// Write the system `config.kdl`.
    pub fn write_system_config(&self, content: &str) {
        std::fs::write(self.config_dir.path().join("config.kdl"), content)
            .expect("Failed to write system config");
    }

    /// Write the project `testify.kdl`.
    pub fn write_project_config(&self, content: &str) {
        std::fs::write(self.project_dir.path().join("testify.kdl"), content)
            .expect("Failed to write project config");
    }

    /// Run `args` and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.testify().args(args).output().unwrap();
        assert!(
            output.status.success(),
            "testify {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
