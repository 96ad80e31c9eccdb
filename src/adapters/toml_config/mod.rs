// TOML config adapter - Configuration persistence using TOML files

use std::path::{Path, PathBuf};

use crate::config_initialization::AppConfig;
use crate::error::ConfigError;

/// Reads and writes the application configuration file
pub struct TomlConfigStore {
    path: PathBuf,
}

impl TomlConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file; `None` when it does not exist
    pub fn load(&self) -> Result<Option<AppConfig>, ConfigError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.display().to_string(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(Some(config))
    }

    /// Write the configuration, creating parent directories as needed
    pub fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.path, content)?;
        tracing::info!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}
