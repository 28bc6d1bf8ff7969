//! Script event bridge for mcjs
//!
//! Script modules subscribe to host events by name or type; the bridge
//! resolves the name, installs one interception point per type with the host
//! and fans each fired event out to the subscribed callbacks in priority order,
//! each under a deadline. Script-built windows ride on the same dispatch path.

pub mod bridge;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod fanout;
pub mod gui;
pub mod registrar;
pub mod registry;
pub mod resolver;
pub mod scheduler;
pub mod timeout;

pub use bridge::{BuildError, EventBridge, EventBridgeBuilder, EventTarget};
pub use config::{BridgeConfig, ConfigLoadError, McjsConfig};
pub use context::{
    CallbackHandle, ModuleId, NativeEnvironment, ScriptEnvironment, ScriptValue,
    SubscriptionContext,
};
pub use dispatch::{DispatchCoordinator, DispatchOutcome};
pub use error::{BridgeError, HandlerError, ResolveError, ScriptError};
pub use fanout::FanoutReport;
pub use gui::{SessionState, WindowBuilder, WindowHandle, WindowRouting};
pub use registrar::RegistrationStrategy;
pub use timeout::TimeoutGuard;
