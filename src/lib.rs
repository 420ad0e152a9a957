//! Testify - embeddable testimonial widget.
//!
//! This library provides the widget loader that host pages embed (compiled to
//! WebAssembly with the `wasm` feature) and the native pieces behind the
//! `testify` developer CLI: configuration, frame URL tooling and a headless
//! host page for previewing what the loader does.

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod commands;
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod embed;
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

/// Library-level error type for Testify operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[cfg(not(target_arch = "wasm32"))]
    #[error("Config error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Space name is required")]
    MissingSpaceName,

    #[error("Container element #{0} not found")]
    ContainerNotFound(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid embed URL: {0}")]
    InvalidEmbedUrl(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Testify operations.
pub type Result<T> = std::result::Result<T, Error>;
