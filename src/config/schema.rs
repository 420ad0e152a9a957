//! KDL schema for `config.kdl` / `testify.kdl`.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Conversion to/from KDL documents
//! - Loading and saving files
//! - Validation

use std::path::Path;

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use url::Url;

use crate::embed::Theme;
use crate::{Error, Result};

/// Keys accepted in a config file, in the order they are written.
pub const CONFIG_KEYS: [&str; 3] = ["embed-base-url", "resizer-url", "default-theme"];

/// Widget settings stored in a config file.
///
/// # KDL Schema
///
/// ```kdl
/// embed-base-url "https://testify.example.com/embed"
/// resizer-url "https://cdn.example.com/iframeResizer.min.js"
/// default-theme "dark"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestifyConfig {
    /// Prefix of every frame source URL
    pub embed_base_url: Option<String>,

    /// Script URL of the resize library
    pub resizer_url: Option<String>,

    /// Theme used by the CLI when no `--theme` is given
    pub default_theme: Option<Theme>,
}

impl TestifyConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref base) = self.embed_base_url {
            match Url::parse(base) {
                Ok(url) if !url.cannot_be_a_base() => {}
                _ => return Err(format!("embed-base-url must be an absolute URL, got {}", base)),
            }
        }
        if let Some(ref resizer) = self.resizer_url {
            if resizer.trim().is_empty() {
                return Err("resizer-url must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document. Unknown nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();
        for key in CONFIG_KEYS {
            if let Some(value) = first_string(doc, key) {
                // Keys come from CONFIG_KEYS, so this cannot fail.
                let _ = config.set(key, &value);
            }
        }
        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        for key in CONFIG_KEYS {
            if let Some(value) = self.get(key) {
                let mut node = KdlNode::new(key);
                node.push(KdlEntry::new(KdlValue::String(value)));
                doc.nodes_mut().push(node);
            }
        }
        doc
    }

    /// Read a config file. A missing file is an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse()?;
        let config = Self::from_kdl(&doc);
        config
            .validate()
            .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write the config file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate().map_err(Error::InvalidInput)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut doc = self.to_kdl();
        doc.autoformat();
        std::fs::write(path, doc.to_string())?;
        Ok(())
    }

    /// Value of `key` as text.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "embed-base-url" => self.embed_base_url.clone(),
            "resizer-url" => self.resizer_url.clone(),
            "default-theme" => self.default_theme.as_ref().map(Theme::to_string),
            _ => None,
        }
    }

    /// Set `key` from text.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "embed-base-url" => self.embed_base_url = Some(value.to_string()),
            "resizer-url" => self.resizer_url = Some(value.to_string()),
            "default-theme" => self.default_theme = Some(Theme::parse(value)),
            other => {
                return Err(Error::InvalidInput(format!(
                    "unknown config key '{}' (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)?
        .entries()
        .first()?
        .value()
        .as_string()
        .map(str::to_string)
}
