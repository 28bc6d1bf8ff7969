use std::any::Any;
use std::sync::Arc;

use crate::descriptor::EventTypeDescriptor;
use crate::window::{ItemStack, ViewerId, WindowId, WindowInteraction};

// ============================================================================
// Fired events
// ============================================================================

/// An event instance fired by the host
///
/// Instances are shared across threads while handlers run, so any mutable
/// state (the suppressed flag) uses interior mutability.
pub trait HostEvent: Send + Sync + 'static {
    /// Concrete runtime type of this instance
    fn event_type(&self) -> &EventTypeDescriptor;

    /// Whether the event is currently suppressed (cancelled)
    fn is_cancelled(&self) -> bool {
        false
    }

    /// Mark the event suppressed or allowed; ignored by events that cannot be cancelled
    fn set_cancelled(&self, _cancelled: bool) {}

    /// Window click/close payload, if this is one of the window event kinds
    fn window_interaction(&self) -> Option<WindowInteraction<'_>> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a fired event
pub type EventRef = Arc<dyn HostEvent>;

/// Reference identity of an event instance
///
/// Two handles are the same instance iff they point to the same allocation,
/// regardless of the event's contents.
pub fn event_identity(event: &EventRef) -> usize {
    Arc::as_ptr(event) as *const () as usize
}

/// Receives events from an interception point installed with the host
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &EventRef);
}

// ============================================================================
// Host registration surfaces
// ============================================================================

/// Error reported by the host when an installation or window call fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Host does not support this operation: {0}")]
    Unsupported(String),
    #[error("Host rejected the request: {0}")]
    Rejected(String),
    #[error("Unknown window {0:?}")]
    UnknownWindow(WindowId),
}

/// The host's preferred entry point: register a callback for a type in one call
pub trait DynamicRegistrationApi: Send + Sync {
    fn register_dynamic(
        &self,
        event_type: &EventTypeDescriptor,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), HostError>;
}

/// One type's internal listener chain
pub trait ListenerChain: Send + Sync {
    fn install(&self, sink: Arc<dyn EventSink>) -> Result<(), HostError>;
}

/// Lower-level access to per-type listener chains, available on older hosts
pub trait ListenerChainApi: Send + Sync {
    /// Locate the chain for `event_type`, or None when the type exposes none
    fn listener_chain(&self, event_type: &EventTypeDescriptor) -> Option<Arc<dyn ListenerChain>>;
}

// ============================================================================
// Window surface
// ============================================================================

/// Host-side inventory windows
pub trait WindowHost: Send + Sync {
    /// Materialize a new window with `size` slots
    fn create_window(&self, title: &str, size: usize) -> WindowId;

    fn window_size(&self, window: WindowId) -> Option<usize>;

    fn set_slot(&self, window: WindowId, slot: usize, item: Option<ItemStack>);

    fn slot(&self, window: WindowId, slot: usize) -> Option<ItemStack>;

    fn clear(&self, window: WindowId);

    /// Show the window to a viewer
    fn open(&self, window: WindowId, viewer: &ViewerId) -> Result<(), HostError>;
}
