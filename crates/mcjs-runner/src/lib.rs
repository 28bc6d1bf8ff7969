//! Local host and binary support for mcjs
//!
//! [`LocalEventBus`] stands in for a game server: it owns per-type listener
//! chains, fires events through a type and its ancestors the way a server bus
//! does, and renders windows in memory. The demo modules and the `mcjs` binary
//! drive an [`mcjs_bridge::EventBridge`] against it.

pub mod config;
pub mod demo;
pub mod local_bus;
pub mod logging;

pub use config::{RunnerConfig, RunnerSettings};
pub use demo::{DemoModules, ScenarioReport};
pub use local_bus::LocalEventBus;
pub use logging::init_logging;
