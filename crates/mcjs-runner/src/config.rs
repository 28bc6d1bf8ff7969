use std::path::Path;
use std::time::Duration;

use mcjs_bridge::config::{load_toml, save_toml, ConfigLoadError, McjsConfig};
use serde::{Deserialize, Serialize};

/// Host tick loop settings, the `[runner]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interval between host ticks in milliseconds (default: 50ms, 20Hz)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    50
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl RunnerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// The shared `config.toml` plus the runner's own section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(flatten)]
    pub mcjs: McjsConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

impl RunnerSettings {
    pub fn load() -> Result<Self, ConfigLoadError> {
        let path = McjsConfig::config_path().ok_or(ConfigLoadError::NotFound)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        load_toml(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        save_toml(self, path)
    }
}
