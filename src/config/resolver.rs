//! Unified precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`TESTIFY_EMBED_BASE_URL`, `TESTIFY_RESIZER_URL`)
//! 3. Project `testify.kdl`
//! 4. System `config.kdl`
//! 5. Built-in defaults

use std::path::Path;

use serde::Serialize;

use super::schema::TestifyConfig;
use super::{project_config_path, system_config_path};
use crate::Result;
use crate::embed::widget::DEFAULT_EMBED_BASE_URL;
use crate::embed::{Theme, WidgetSettings, resize::DEFAULT_RESIZER_URL};

/// Environment variable overriding the embed base URL.
pub const EMBED_BASE_URL_ENV: &str = "TESTIFY_EMBED_BASE_URL";

/// Environment variable overriding the resize library URL.
pub const RESIZER_URL_ENV: &str = "TESTIFY_RESIZER_URL";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from environment variable
    EnvVar(String),
    /// Value from the project config file
    Project,
    /// Value from the system config file
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub embed_base_url: Resolved<String>,
    pub resizer_url: Resolved<String>,
    pub default_theme: Resolved<Theme>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            embed_base_url: Resolved::new(
                DEFAULT_EMBED_BASE_URL.to_string(),
                ValueSource::Default,
            ),
            resizer_url: Resolved::new(DEFAULT_RESIZER_URL.to_string(), ValueSource::Default),
            default_theme: Resolved::new(Theme::Light, ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    /// Widget settings built from the resolved values.
    pub fn to_settings(&self) -> Result<WidgetSettings> {
        WidgetSettings::new(&self.embed_base_url.value, self.resizer_url.value.clone())
    }

    /// Resolved entries as `(key, value, source)` rows, in file key order.
    pub fn entries(&self) -> Vec<(&'static str, String, &ValueSource)> {
        vec![
            (
                "embed-base-url",
                self.embed_base_url.value.clone(),
                &self.embed_base_url.source,
            ),
            (
                "resizer-url",
                self.resizer_url.value.clone(),
                &self.resizer_url.source,
            ),
            (
                "default-theme",
                self.default_theme.value.to_string(),
                &self.default_theme.source,
            ),
        ]
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub embed_base_url: Option<String>,
    pub resizer_url: Option<String>,
    pub default_theme: Option<Theme>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embed_base_url(mut self, url: impl Into<String>) -> Self {
        self.embed_base_url = Some(url.into());
        self
    }

    pub fn with_resizer_url(mut self, url: impl Into<String>) -> Self {
        self.resizer_url = Some(url.into());
        self
    }

    pub fn with_default_theme(mut self, theme: Theme) -> Self {
        self.default_theme = Some(theme);
        self
    }
}

/// Resolve configuration for `project_dir` with full precedence chain.
pub fn resolve_config(project_dir: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = match system_config_path() {
        Some(path) => TestifyConfig::load(&path)?,
        None => TestifyConfig::new(),
    };
    let project = TestifyConfig::load(&project_config_path(project_dir))?;
    Ok(resolve_layers(&system, &project, |name| std::env::var(name).ok(), overrides))
}

/// Resolve from already-loaded layers. `env` looks up environment variables.
pub fn resolve_layers(
    system: &TestifyConfig,
    project: &TestifyConfig,
    env: impl Fn(&str) -> Option<String>,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();
    let env_value = |name: &str| {
        env(name)
            .filter(|value| !value.is_empty())
            .map(|value| (value, ValueSource::EnvVar(name.to_string())))
    };

    ResolvedConfig {
        embed_base_url: pick(
            [
                overrides.embed_base_url.clone().map(|v| (v, ValueSource::CliFlag)),
                env_value(EMBED_BASE_URL_ENV),
                project.embed_base_url.clone().map(|v| (v, ValueSource::Project)),
                system.embed_base_url.clone().map(|v| (v, ValueSource::System)),
            ],
            defaults.embed_base_url,
        ),
        resizer_url: pick(
            [
                overrides.resizer_url.clone().map(|v| (v, ValueSource::CliFlag)),
                env_value(RESIZER_URL_ENV),
                project.resizer_url.clone().map(|v| (v, ValueSource::Project)),
                system.resizer_url.clone().map(|v| (v, ValueSource::System)),
            ],
            defaults.resizer_url,
        ),
        default_theme: pick(
            [
                overrides.default_theme.clone().map(|v| (v, ValueSource::CliFlag)),
                project.default_theme.clone().map(|v| (v, ValueSource::Project)),
                system.default_theme.clone().map(|v| (v, ValueSource::System)),
            ],
            defaults.default_theme,
        ),
    }
}

/// First present candidate, else the default.
fn pick<T, const N: usize>(
    candidates: [Option<(T, ValueSource)>; N],
    default: Resolved<T>,
) -> Resolved<T> {
    candidates
        .into_iter()
        .flatten()
        .next()
        .map(|(value, source)| Resolved::new(value, source))
        .unwrap_or(default)
}
