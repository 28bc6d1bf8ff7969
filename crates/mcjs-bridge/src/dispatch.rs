use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use mcjs_events::{event_identity, EventRef, EventTypeDescriptor};
use tracing::{debug, error, info};

use crate::error::panic_message;
use crate::fanout::{FanoutExecutor, FanoutReport};
use crate::gui::{SessionManager, WindowRouting};
use crate::registrar::{BridgeTarget, BridgedTypes};
use crate::registry::HandlerRegistry;

/// Event instances currently being dispatched, by reference identity
#[derive(Debug, Default)]
pub struct InFlightSet {
    events: Mutex<HashSet<usize>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `event` for one dispatch pass; None if it is already being dispatched
    pub fn try_acquire(&self, event: &EventRef) -> Option<InFlightGuard<'_>> {
        let key = event_identity(event);
        let inserted = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);
        inserted.then_some(InFlightGuard { set: self, key })
    }

    pub fn contains(&self, event: &EventRef) -> bool {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&event_identity(event))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases the event's in-flight entry when dropped, including during unwinding
pub struct InFlightGuard<'a> {
    set: &'a InFlightSet,
    key: usize,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// What one dispatch pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The bridge has been shut down
    Inactive,
    /// The same instance was already being dispatched
    Duplicate,
    /// Reached through an ancestor's listener; the listener of a more specific
    /// bridged type delivers this firing
    Shadowed,
    /// Handled by a window session
    Window(WindowRouting),
    NoHandlers,
    Delivered(FanoutReport),
    /// A panic escaped the pass and was contained
    Aborted(String),
}

/// Receives every bridged event from the host
///
/// Window events for tracked windows go to the session manager; everything
/// else is matched against the handler registry and fanned out.
pub struct DispatchCoordinator {
    registry: Arc<HandlerRegistry>,
    sessions: Arc<SessionManager>,
    bridged: Arc<BridgedTypes>,
    fanout: FanoutExecutor,
    in_flight: InFlightSet,
    active: AtomicBool,
    debug_mode: bool,
}

impl DispatchCoordinator {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        sessions: Arc<SessionManager>,
        bridged: Arc<BridgedTypes>,
        fanout: FanoutExecutor,
        debug_mode: bool,
    ) -> Self {
        Self {
            registry,
            sessions,
            bridged,
            fanout,
            in_flight: InFlightSet::new(),
            active: AtomicBool::new(true),
            debug_mode,
        }
    }

    /// Dispatch an event delivered by the listener installed for `bridged_type`
    pub fn dispatch_from(
        &self,
        bridged_type: &EventTypeDescriptor,
        event: &EventRef,
    ) -> DispatchOutcome {
        let owner = self.bridged.owner_of(event.event_type());
        if owner.as_ref().is_some_and(|owner| owner != bridged_type) {
            if self.debug_mode {
                info!(target: "bridge", "Skipping {} seen through {} listener",
                    event.event_type(), bridged_type);
            }
            return DispatchOutcome::Shadowed;
        }
        self.dispatch(event)
    }

    /// Dispatch one firing of `event`
    pub fn dispatch(&self, event: &EventRef) -> DispatchOutcome {
        if !self.active.load(Ordering::SeqCst) {
            return DispatchOutcome::Inactive;
        }

        let type_name = event.event_type().qualified_name();
        let Some(_guard) = self.in_flight.try_acquire(event) else {
            if self.debug_mode {
                info!(target: "bridge", "Skipping duplicate dispatch of {}", type_name);
            }
            return DispatchOutcome::Duplicate;
        };

        match catch_unwind(AssertUnwindSafe(|| self.dispatch_inner(event))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(target: "bridge", "Dispatch of {} aborted: {}", type_name, message);
                DispatchOutcome::Aborted(message)
            }
        }
    }

    fn dispatch_inner(&self, event: &EventRef) -> DispatchOutcome {
        let type_name = event.event_type().qualified_name();

        if event.window_interaction().is_some() {
            match self.sessions.route(event) {
                WindowRouting::Unmanaged => {}
                routing => {
                    debug!(target: "gui", "{} routed to window session: {:?}", type_name, routing);
                    return DispatchOutcome::Window(routing);
                }
            }
        }

        let matched = self.registry.snapshot_for(event.event_type());
        if matched.is_empty() {
            debug!(target: "bridge", "No handlers for {}", type_name);
            return DispatchOutcome::NoHandlers;
        }

        if self.debug_mode {
            info!(target: "bridge", "Dispatching {} to {} subscription(s)", type_name, matched.len());
        }
        DispatchOutcome::Delivered(self.fanout.execute(event, matched))
    }

    pub fn in_flight(&self) -> &InFlightSet {
        &self.in_flight
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop handling events; bridge listeners stay installed but do nothing
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl BridgeTarget for DispatchCoordinator {
    fn on_bridged_event(&self, bridged_type: &EventTypeDescriptor, event: &EventRef) {
        self.dispatch_from(bridged_type, event);
    }
}
