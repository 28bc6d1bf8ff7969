use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use mcjs_events::{
    DynamicRegistrationApi, EventRef, EventSink, EventTypeDescriptor, ListenerChainApi,
};
use tracing::{debug, error, info, warn};

use crate::error::BridgeError;

/// Where bridge listeners forward fired events
pub trait BridgeTarget: Send + Sync {
    /// `bridged_type` is the type the forwarding listener was installed for
    fn on_bridged_event(&self, bridged_type: &EventTypeDescriptor, event: &EventRef);
}

/// The interception point installed with the host for one type
pub struct BridgeListener {
    bridged_type: EventTypeDescriptor,
    target: Arc<dyn BridgeTarget>,
}

impl EventSink for BridgeListener {
    fn on_event(&self, event: &EventRef) {
        self.target.on_bridged_event(&self.bridged_type, event);
    }
}

/// Types with an installed bridge listener
#[derive(Debug, Default)]
pub struct BridgedTypes {
    types: RwLock<HashSet<EventTypeDescriptor>>,
}

impl BridgedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event_type: &EventTypeDescriptor) -> bool {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(event_type)
    }

    fn insert(&self, event_type: EventTypeDescriptor) {
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event_type);
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most specific bridged type in `fired`'s lineage
    ///
    /// A host runs the listener chains of a type and all its ancestors, so
    /// several bridge listeners can see one firing. Only the listener of this
    /// type delivers it.
    pub fn owner_of(&self, fired: &EventTypeDescriptor) -> Option<EventTypeDescriptor> {
        let types = self.types.read().unwrap_or_else(PoisonError::into_inner);
        fired.lineage().find(|t| types.contains(*t)).cloned()
    }
}

/// One way of installing an interception point with the host
pub trait RegistrationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Install `sink` for `event_type`; false when this path is unavailable or fails
    fn try_register(&self, event_type: &EventTypeDescriptor, sink: &Arc<dyn EventSink>) -> bool;
}

/// The host's one-call dynamic registration entry point
pub struct DynamicRegistration {
    api: Arc<dyn DynamicRegistrationApi>,
}

impl DynamicRegistration {
    pub fn new(api: Arc<dyn DynamicRegistrationApi>) -> Self {
        Self { api }
    }
}

impl RegistrationStrategy for DynamicRegistration {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    fn try_register(&self, event_type: &EventTypeDescriptor, sink: &Arc<dyn EventSink>) -> bool {
        match self.api.register_dynamic(event_type, sink.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!(target: "bridge", "Dynamic registration unavailable for {}: {}", event_type, e);
                false
            }
        }
    }
}

/// Fallback that appends to the type's listener chain directly
pub struct ListenerChainRegistration {
    api: Arc<dyn ListenerChainApi>,
}

impl ListenerChainRegistration {
    pub fn new(api: Arc<dyn ListenerChainApi>) -> Self {
        Self { api }
    }
}

impl RegistrationStrategy for ListenerChainRegistration {
    fn name(&self) -> &'static str {
        "listener-chain"
    }

    fn try_register(&self, event_type: &EventTypeDescriptor, sink: &Arc<dyn EventSink>) -> bool {
        let Some(chain) = self.api.listener_chain(event_type) else {
            debug!(target: "bridge", "{} exposes no listener chain", event_type);
            return false;
        };
        match chain.install(sink.clone()) {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "bridge", "Failed to install into listener chain of {}: {}", event_type, e);
                false
            }
        }
    }
}

/// Installs at most one interception point per event type
///
/// Strategies are tried in order and the first success wins. Every installed
/// point forwards to the same target.
pub struct BridgeRegistrar {
    strategies: Vec<Box<dyn RegistrationStrategy>>,
    target: Arc<dyn BridgeTarget>,
    bridged: Arc<BridgedTypes>,
    install_lock: Mutex<()>,
}

impl BridgeRegistrar {
    pub fn new(
        target: Arc<dyn BridgeTarget>,
        bridged: Arc<BridgedTypes>,
        strategies: Vec<Box<dyn RegistrationStrategy>>,
    ) -> Self {
        Self {
            strategies,
            target,
            bridged,
            install_lock: Mutex::new(()),
        }
    }

    /// Make sure the host intercepts `event_type`
    ///
    /// Returns true if this call installed the interception point, false if
    /// it was already in place.
    pub fn ensure_bridged(&self, event_type: &EventTypeDescriptor) -> Result<bool, BridgeError> {
        // Held across installation so concurrent callers cannot both install
        let _install = self
            .install_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.bridged.contains(event_type) {
            return Ok(false);
        }

        let listener: Arc<dyn EventSink> = Arc::new(BridgeListener {
            bridged_type: event_type.clone(),
            target: self.target.clone(),
        });
        for strategy in &self.strategies {
            if strategy.try_register(event_type, &listener) {
                info!(target: "bridge", "Bridged {} via {}", event_type, strategy.name());
                self.bridged.insert(event_type.clone());
                return Ok(true);
            }
        }

        error!(target: "bridge", "No registration path succeeded for {}", event_type);
        Err(BridgeError::RegistrationFailure {
            type_name: event_type.qualified_name().to_string(),
        })
    }

    pub fn is_bridged(&self, event_type: &EventTypeDescriptor) -> bool {
        self.bridged.contains(event_type)
    }

    pub fn bridged_count(&self) -> usize {
        self.bridged.len()
    }

    pub fn bridged_types(&self) -> &Arc<BridgedTypes> {
        &self.bridged
    }
}
