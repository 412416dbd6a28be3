//! Error type for the overlay application.
//!
//! Only startup can fail: reading the config, opening the detector source,
//! or creating the window.  Per-frame problems are logged and skipped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Config {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("detector source unavailable: {0}")]
    Source(String),

    #[error("window: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
