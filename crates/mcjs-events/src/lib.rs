//! Host-side event types for mcjs
//!
//! This crate holds everything the bridge needs to know about the host without
//! depending on a live server: type descriptors and the taxonomy they come from,
//! the fired-event and registration traits a host implements, handler priority
//! tiers and the window event payloads.

pub mod basic_event;
pub mod descriptor;
pub mod host;
pub mod priority;
pub mod taxonomy;
pub mod window;

pub use basic_event::BasicEvent;
pub use descriptor::{EventTypeDescriptor, Lineage, TypeKind};
pub use host::{
    event_identity, DynamicRegistrationApi, EventRef, EventSink, HostError, HostEvent,
    ListenerChain, ListenerChainApi, WindowHost,
};
pub use priority::{EventPriority, UnknownPriority};
pub use taxonomy::{EventTaxonomy, StaticTaxonomy, ROOT_NAMESPACE};
pub use window::{
    ClickGesture, ClickTarget, InventoryClickEvent, InventoryCloseEvent, ItemStack, ViewerId,
    WindowId, WindowInteraction, ROW_SIZE,
};
