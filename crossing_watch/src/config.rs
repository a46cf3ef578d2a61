//! Runtime configuration.
//!
//! Defaults, then `<config_dir>/crossing/config.json` (or the file named by
//! `CROSSING_CONFIG`), then `CROSSING_CONTROLLER_URL` / `CROSSING_POLL_MS`.

use crate::error::ConfigError;
use crate::paths::AppPaths;
use crossing::fallback::FallbackRanges;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const ENV_CONFIG: &str = "CROSSING_CONFIG";
pub const ENV_CONTROLLER_URL: &str = "CROSSING_CONTROLLER_URL";
pub const ENV_POLL_MS: &str = "CROSSING_POLL_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub controller_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub fallback: FallbackRanges,
    /// Fixed seed for the fallback pattern; clock-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            controller_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 500,
            request_timeout_ms: 2_000,
            fallback: FallbackRanges::default(),
            seed: None,
        }
    }
}

impl WatchConfig {
    /// Resolve the effective configuration from disk and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var_os(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => match AppPaths::new() {
                Ok(paths) if paths.config_file().is_file() => {
                    Self::from_file(&paths.config_file())?
                }
                _ => Self::default(),
            },
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_CONTROLLER_URL) {
            self.controller_url = url;
        }
        if let Some(ms) = lookup(ENV_POLL_MS) {
            self.poll_interval_ms = ms.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_POLL_MS} must be an integer, got {ms:?}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller_url.trim().is_empty() {
            return Err(ConfigError::Invalid("controller_url is empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be > 0".into()));
        }
        self.fallback
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
