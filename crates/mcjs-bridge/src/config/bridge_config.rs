use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Log every dispatch and handler execution at info level
    #[serde(default)]
    pub debug_mode: bool,

    /// Per-callback deadline in milliseconds, 0 disables the deadline (default: 5000)
    #[serde(default = "default_max_execution_time")]
    pub max_execution_time_ms: u64,

    /// Grace period before a closed window's callbacks are released (default: 50ms)
    #[serde(default = "default_release_delay")]
    pub release_delay_ms: u64,

    /// Modules whose registrations are refused
    #[serde(default)]
    pub disabled_modules: Vec<String>,
}

fn default_max_execution_time() -> u64 {
    5000
}

fn default_release_delay() -> u64 {
    50
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            max_execution_time_ms: default_max_execution_time(),
            release_delay_ms: default_release_delay(),
            disabled_modules: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Callback deadline, None when unbounded
    pub fn timeout(&self) -> Option<Duration> {
        match self.max_execution_time_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn release_delay(&self) -> Duration {
        Duration::from_millis(self.release_delay_ms)
    }

    pub fn is_module_disabled(&self, module: &str) -> bool {
        self.disabled_modules.iter().any(|m| m == module)
    }
}
