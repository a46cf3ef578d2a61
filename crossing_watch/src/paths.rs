//! Cross-platform application paths

use crate::error::ConfigError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    config_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("could not determine config directory".into()))?;
        Ok(Self::at(base.join("crossing")))
    }

    pub fn at(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }
}
