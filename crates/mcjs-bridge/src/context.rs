use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mcjs_events::{EventRef, WindowId};

use crate::error::ScriptError;

/// Identity of a loaded script module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Opaque reference to a function previously obtained from a script environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(pub u64);

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A positional argument passed to a script callback
#[derive(Clone)]
pub enum ScriptValue {
    Event(EventRef),
    Window(WindowId),
    Int(i64),
    Text(String),
    Bool(bool),
}

impl ScriptValue {
    pub fn as_event(&self) -> Option<&EventRef> {
        match self {
            ScriptValue::Event(event) => Some(event),
            _ => None,
        }
    }
}

impl fmt::Debug for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Event(event) => write!(f, "Event({})", event.event_type()),
            ScriptValue::Window(id) => write!(f, "Window({})", id),
            ScriptValue::Int(v) => write!(f, "Int({})", v),
            ScriptValue::Text(v) => write!(f, "Text({:?})", v),
            ScriptValue::Bool(v) => write!(f, "Bool({})", v),
        }
    }
}

/// The script runtime a module's callbacks live in
pub trait ScriptEnvironment: Send + Sync {
    /// Invoke a callback with positional arguments
    ///
    /// Invoking a callback the environment no longer knows is an error.
    fn invoke(&self, callback: &CallbackHandle, args: &[ScriptValue]) -> Result<(), ScriptError>;

    /// Ask the runtime to abandon whatever it is currently executing
    ///
    /// Called when a callback overruns its deadline. Runtimes that cannot be
    /// interrupted ignore it.
    fn interrupt(&self) {}
}

/// Execution environment plus owning module
///
/// Two contexts are equal iff they share the same environment instance and
/// the same owning module.
#[derive(Clone)]
pub struct SubscriptionContext {
    environment: Arc<dyn ScriptEnvironment>,
    module: ModuleId,
}

impl SubscriptionContext {
    pub fn new(environment: Arc<dyn ScriptEnvironment>, module: ModuleId) -> Self {
        Self {
            environment,
            module,
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn environment(&self) -> &Arc<dyn ScriptEnvironment> {
        &self.environment
    }

    fn environment_addr(&self) -> usize {
        Arc::as_ptr(&self.environment) as *const () as usize
    }
}

impl PartialEq for SubscriptionContext {
    fn eq(&self, other: &Self) -> bool {
        self.environment_addr() == other.environment_addr() && self.module == other.module
    }
}

impl Eq for SubscriptionContext {}

impl Hash for SubscriptionContext {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.environment_addr().hash(state);
        self.module.hash(state);
    }
}

impl fmt::Debug for SubscriptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionContext")
            .field("module", &self.module)
            .field("environment", &format_args!("{:#x}", self.environment_addr()))
            .finish()
    }
}

// ============================================================================
// Native environment
// ============================================================================

type NativeCallback = Arc<dyn Fn(&[ScriptValue]) -> Result<(), ScriptError> + Send + Sync>;

/// Script environment backed by Rust closures
///
/// Used by native modules and tests. Releasing a callback makes its handle
/// stale, mirroring a script runtime that has unloaded the function.
#[derive(Default)]
pub struct NativeEnvironment {
    callbacks: Mutex<HashMap<u64, NativeCallback>>,
    next_id: AtomicU64,
    interrupts: AtomicUsize,
}

impl NativeEnvironment {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a closure and return a handle to it
    pub fn register<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&[ScriptValue]) -> Result<(), ScriptError> + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        CallbackHandle(id)
    }

    /// Forget a callback; later invocations fail with a stale-callback error
    pub fn release(&self, handle: &CallbackHandle) -> bool {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.0)
            .is_some()
    }

    /// Number of interrupt requests received
    pub fn interrupt_count(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }
}

impl ScriptEnvironment for NativeEnvironment {
    fn invoke(&self, callback: &CallbackHandle, args: &[ScriptValue]) -> Result<(), ScriptError> {
        // Clone out so the lock is not held while the callback runs
        let f = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&callback.0)
            .cloned()
            .ok_or(ScriptError::StaleCallback(callback.0))?;
        f(args)
    }

    fn interrupt(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }
}
