pub mod bridge_config;
pub mod logging_config;
pub mod mcjs_config;
pub mod paths;

pub use bridge_config::BridgeConfig;
pub use logging_config::LoggingConfig;
pub use mcjs_config::{load_toml, save_toml, ConfigLoadError, McjsConfig};
pub use paths::ProjectPaths;
