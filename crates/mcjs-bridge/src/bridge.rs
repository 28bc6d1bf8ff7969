use std::sync::Arc;
use std::time::Instant;

use mcjs_events::{
    DynamicRegistrationApi, EventPriority, EventRef, EventTaxonomy, EventTypeDescriptor,
    ListenerChainApi, WindowHost, WindowId,
};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::context::{CallbackHandle, ModuleId, SubscriptionContext};
use crate::dispatch::{DispatchCoordinator, DispatchOutcome};
use crate::error::{BridgeError, ResolveError};
use crate::fanout::FanoutExecutor;
use crate::gui::{SessionManager, WindowBuilder, WindowHandle};
use crate::registrar::{
    BridgeRegistrar, BridgeTarget, BridgedTypes, DynamicRegistration, ListenerChainRegistration,
    RegistrationStrategy,
};
use crate::registry::HandlerRegistry;
use crate::resolver::EventResolver;
use crate::timeout::TimeoutGuard;

const WINDOW_CLICK_EVENT: &str = "inventory.InventoryClickEvent";
const WINDOW_CLOSE_EVENT: &str = "inventory.InventoryCloseEvent";

/// What a script asked to listen to
#[derive(Debug, Clone)]
pub enum EventTarget {
    /// Symbolic name, resolved through the taxonomy
    Name(String),
    /// An already resolved type
    Type(EventTypeDescriptor),
}

impl From<&str> for EventTarget {
    fn from(name: &str) -> Self {
        EventTarget::Name(name.to_string())
    }
}

impl From<String> for EventTarget {
    fn from(name: String) -> Self {
        EventTarget::Name(name)
    }
}

impl From<EventTypeDescriptor> for EventTarget {
    fn from(event_type: EventTypeDescriptor) -> Self {
        EventTarget::Type(event_type)
    }
}

impl From<&EventTypeDescriptor> for EventTarget {
    fn from(event_type: &EventTypeDescriptor) -> Self {
        EventTarget::Type(event_type.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No event taxonomy provided - use .taxonomy()")]
    MissingTaxonomy,
    #[error("No window host provided - use .window_host()")]
    MissingWindowHost,
    #[error("No registration strategy - use .dynamic_registration() or .listener_chains()")]
    NoRegistrationStrategy,
}

/// Builder for [`EventBridge`]
///
/// Registration strategies are tried in the order they are added.
#[derive(Default)]
pub struct EventBridgeBuilder {
    taxonomy: Option<Arc<dyn EventTaxonomy>>,
    window_host: Option<Arc<dyn WindowHost>>,
    strategies: Vec<Box<dyn RegistrationStrategy>>,
    config: BridgeConfig,
}

impl EventBridgeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn taxonomy(mut self, taxonomy: Arc<dyn EventTaxonomy>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    pub fn window_host(mut self, host: Arc<dyn WindowHost>) -> Self {
        self.window_host = Some(host);
        self
    }

    pub fn dynamic_registration(self, api: Arc<dyn DynamicRegistrationApi>) -> Self {
        self.strategy(Box::new(DynamicRegistration::new(api)))
    }

    pub fn listener_chains(self, api: Arc<dyn ListenerChainApi>) -> Self {
        self.strategy(Box::new(ListenerChainRegistration::new(api)))
    }

    pub fn strategy(mut self, strategy: Box<dyn RegistrationStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<EventBridge, BuildError> {
        let taxonomy = self.taxonomy.ok_or(BuildError::MissingTaxonomy)?;
        let window_host = self.window_host.ok_or(BuildError::MissingWindowHost)?;
        if self.strategies.is_empty() {
            return Err(BuildError::NoRegistrationStrategy);
        }

        let guard = TimeoutGuard::new(self.config.timeout());
        let registry = Arc::new(HandlerRegistry::new());
        let sessions = Arc::new(SessionManager::new(
            window_host,
            guard,
            self.config.release_delay(),
        ));
        let bridged = Arc::new(BridgedTypes::new());
        let coordinator = Arc::new(DispatchCoordinator::new(
            registry.clone(),
            sessions.clone(),
            bridged.clone(),
            FanoutExecutor::new(guard, self.config.debug_mode),
            self.config.debug_mode,
        ));
        let target: Arc<dyn BridgeTarget> = coordinator.clone();
        let registrar = BridgeRegistrar::new(target, bridged, self.strategies);

        info!(target: "bridge", "Event bridge ready (deadline: {:?}, debug: {})",
            guard.deadline(), self.config.debug_mode);

        Ok(EventBridge {
            resolver: EventResolver::new(taxonomy),
            registrar,
            registry,
            coordinator,
            sessions,
            config: self.config,
        })
    }
}

/// Connects script modules to the host's event bus
///
/// One bridge owns its registries; there is no process-wide state. Script
/// entry points are [`EventBridge::register_event`],
/// [`EventBridge::create_window`] and [`EventBridge::refresh_window`].
pub struct EventBridge {
    resolver: EventResolver,
    registrar: BridgeRegistrar,
    registry: Arc<HandlerRegistry>,
    coordinator: Arc<DispatchCoordinator>,
    sessions: Arc<SessionManager>,
    config: BridgeConfig,
}

impl EventBridge {
    pub fn builder() -> EventBridgeBuilder {
        EventBridgeBuilder::new()
    }

    /// Subscribe `callback` to an event type
    ///
    /// Resolves the target, makes sure the host intercepts the type and stores
    /// the handler. Returns the resolved type.
    pub fn register_event(
        &self,
        context: &SubscriptionContext,
        target: impl Into<EventTarget>,
        callback: CallbackHandle,
        priority: EventPriority,
    ) -> Result<EventTypeDescriptor, BridgeError> {
        self.check_module(context.module())?;

        let event_type = match target.into() {
            EventTarget::Name(name) => {
                let resolved = self.resolver.resolve(&name).inspect_err(|e| {
                    warn!(target: "bridge", "'{}' cannot register '{}': {}", context.module(), name, e);
                })?;
                info!(target: "bridge", "Registering event: {} -> {}", name, resolved);
                resolved
            }
            EventTarget::Type(event_type) => event_type,
        };

        if !event_type.is_listenable() {
            warn!(target: "bridge", "'{}' cannot register abstract type {}", context.module(), event_type);
            return Err(ResolveError::InvalidType(event_type.qualified_name().to_string()).into());
        }

        self.registrar.ensure_bridged(&event_type)?;
        let entry = self
            .registry
            .subscribe(&event_type, context, callback, priority);
        debug!(target: "bridge", "'{}' subscribed {} to {} at {}",
            context.module(), entry.callback, event_type, priority);
        Ok(event_type)
    }

    /// Start building a window with `rows` rows (clamped to 1..=6)
    pub fn create_window(
        &self,
        context: &SubscriptionContext,
        title: impl Into<String>,
        rows: usize,
    ) -> Result<WindowBuilder, BridgeError> {
        self.check_module(context.module())?;
        for name in [WINDOW_CLICK_EVENT, WINDOW_CLOSE_EVENT] {
            let event_type = self.resolver.resolve(name)?;
            self.registrar.ensure_bridged(&event_type)?;
        }
        Ok(WindowBuilder::new(
            self.sessions.clone(),
            context.clone(),
            title,
            rows,
        ))
    }

    /// Re-apply a window's last-known contents; false if unknown or closed
    pub fn refresh_window(&self, window: WindowId) -> bool {
        self.sessions.refresh(window)
    }

    pub fn window(&self, window: WindowId) -> Option<WindowHandle> {
        self.sessions.handle(window)
    }

    /// Drive deferred work; call once per host tick
    pub fn tick(&self, now: Instant) -> usize {
        self.sessions.tick(now)
    }

    /// Dispatch an event directly, as the bridge listener would
    pub fn dispatch(&self, event: &EventRef) -> DispatchOutcome {
        self.coordinator.dispatch(event)
    }

    /// Remove a module's handlers and release its windows
    ///
    /// Bridge listeners stay installed; they simply find fewer handlers.
    pub fn unregister_module(&self, module: &ModuleId) -> usize {
        let handlers = self.registry.remove_module(module);
        let windows = self.sessions.release_module(module);
        info!(target: "bridge", "Unregistered '{}': {} handler(s), {} window(s)",
            module, handlers, windows);
        handlers
    }

    /// Drop every handler and session and make the bridge inert
    pub fn shutdown(&self) {
        if !self.coordinator.is_active() {
            return;
        }
        self.coordinator.deactivate();
        self.registry.clear();
        let windows = self.sessions.release_all();
        info!(target: "bridge", "Event bridge shut down ({} window(s) released)", windows);
    }

    pub fn is_shut_down(&self) -> bool {
        !self.coordinator.is_active()
    }

    /// Resolve a symbolic name without registering anything
    pub fn resolve(&self, name: &str) -> Result<EventTypeDescriptor, ResolveError> {
        self.resolver.resolve(name)
    }

    pub fn is_bridged(&self, event_type: &EventTypeDescriptor) -> bool {
        self.registrar.is_bridged(event_type)
    }

    pub fn bridged_count(&self) -> usize {
        self.registrar.bridged_count()
    }

    pub fn handler_count(&self) -> usize {
        self.registry.handler_count()
    }

    pub fn coordinator(&self) -> &DispatchCoordinator {
        &self.coordinator
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn check_module(&self, module: &ModuleId) -> Result<(), BridgeError> {
        if self.is_shut_down() {
            return Err(BridgeError::ShutDown);
        }
        if self.config.is_module_disabled(module.as_str()) {
            warn!(target: "bridge", "Refusing registration from disabled module '{}'", module);
            return Err(BridgeError::ModuleDisabled(module.to_string()));
        }
        Ok(())
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
