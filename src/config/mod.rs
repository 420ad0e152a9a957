//! Configuration for the `testify` CLI.
//!
//! Settings live in KDL files at two levels:
//!
//! - System: `$TESTIFY_CONFIG_DIR/config.kdl`, otherwise
//!   `~/.config/testify/config.kdl`
//! - Project: `./testify.kdl`
//!
//! Both accept the same keys:
//! - `embed-base-url` - Prefix of every frame source URL
//! - `resizer-url` - Script URL of the resize library
//! - `default-theme` - Theme used when no `--theme` is given
//!
//! ## Precedence
//!
//! CLI flag > environment variable > project file > system file > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

use std::path::{Path, PathBuf};

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, EMBED_BASE_URL_ENV, RESIZER_URL_ENV, Resolved, ResolvedConfig, ValueSource,
    resolve_config,
};
pub use schema::{CONFIG_KEYS, TestifyConfig};

/// Environment variable that relocates the system config directory.
pub const CONFIG_DIR_ENV: &str = "TESTIFY_CONFIG_DIR";

/// File name of the project-level config.
pub const PROJECT_CONFIG_FILE: &str = "testify.kdl";

/// Path of the system-level config file, if a config directory is known.
pub fn system_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join("config.kdl"));
        }
    }
    dirs::config_dir().map(|dir| dir.join("testify").join("config.kdl"))
}

/// Path of the project-level config file for `project_dir`.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILE)
}
