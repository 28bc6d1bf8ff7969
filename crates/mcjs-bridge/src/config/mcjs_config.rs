use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::config::{bridge_config::BridgeConfig, logging_config::LoggingConfig, paths::ProjectPaths};

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("IO error reading config: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McjsConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl McjsConfig {
    /// Location of `config.toml` in the platform config directory
    pub fn config_path() -> Option<PathBuf> {
        ProjectPaths::new("mcjs").map(|p| p.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigLoadError> {
        let path = Self::config_path().ok_or(ConfigLoadError::NotFound)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        load_toml(path)
    }

    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        save_toml(self, path)
    }
}

/// Read a TOML config file into any section layout
///
/// Binaries that extend the file with their own sections load through this too.
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigLoadError> {
    if !path.exists() {
        return Err(ConfigLoadError::NotFound);
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
    let config = toml::from_str(&content).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write `config` as pretty TOML, creating parent directories
pub fn save_toml<T: Serialize>(config: &T, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    info!("Saved config to {}", path.display());
    Ok(())
}
