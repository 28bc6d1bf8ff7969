use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file in the data directory
    #[serde(default)]
    pub file: bool,

    /// Filter directive used when RUST_LOG is unset (default: info)
    #[serde(default)]
    pub level: Option<String>,
}
