use std::time::Duration;

/// Failure to map a symbolic event name to a type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Event type not found: {0}")]
    NotFound(String),
    /// The name resolved to the abstract root, or to a type without its own listener chain
    #[error("Cannot register for '{0}', use a concrete event type like 'player.PlayerJoinEvent'")]
    InvalidType(String),
}

/// Synchronous errors surfaced to a registering script
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Failed to install a bridge listener for {type_name}")]
    RegistrationFailure { type_name: String },
    #[error("Module '{0}' is disabled")]
    ModuleDisabled(String),
    #[error("Event bridge has been shut down")]
    ShutDown,
}

/// Errors raised by the script layer when invoking a callback
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("Callback {0} is no longer valid")]
    StaleCallback(u64),
    #[error("Script error: {0}")]
    Failed(String),
    #[error("Script execution was interrupted")]
    Interrupted,
}

/// Outcome of one failed handler invocation, contained within a dispatch pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Execution(#[from] ScriptError),
    #[error("Handler exceeded its deadline of {deadline:?}")]
    Timeout { deadline: Duration },
    #[error("Handler panicked: {0}")]
    Panicked(String),
    #[error("Failed to spawn handler worker: {0}")]
    WorkerSpawn(String),
}

impl HandlerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HandlerError::Timeout { .. })
    }
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
