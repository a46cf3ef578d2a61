//! Error types for the synchronizer.

use std::path::PathBuf;
use thiserror::Error;

/// Why a poll produced no usable reading. Every variant routes to the fallback path.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("controller unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("controller answered with HTTP {0}")]
    Status(u16),

    #[error("malformed controller payload: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("controls disabled while the controller is offline")]
    ControlsDisabled,

    #[error("command not delivered: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("controller rejected command (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
