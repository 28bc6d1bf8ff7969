use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::descriptor::EventTypeDescriptor;
use crate::host::HostEvent;

/// Slots per inventory row
pub const ROW_SIZE: usize = 9;

/// Host identifier of a materialized window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window-{}", self.0)
    }
}

/// The player looking at a window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerId(pub String);

impl ViewerId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An item placed in a window slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: String,
    pub amount: u32,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ItemStack {
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            display_name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Same material and display name, ignoring the amount
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.material == other.material && self.display_name == other.display_name
    }
}

/// Kind of click gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickGesture {
    Left,
    Right,
    ShiftLeft,
    ShiftRight,
    /// Move the clicked stack into the other open inventory
    MoveToOtherInventory,
    NumberKey,
    Drop,
    Other,
}

impl ClickGesture {
    pub fn is_shift_click(self) -> bool {
        matches!(
            self,
            ClickGesture::ShiftLeft | ClickGesture::ShiftRight | ClickGesture::MoveToOtherInventory
        )
    }
}

/// Which inventory of the open view a click landed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickTarget {
    /// Outside any inventory
    Outside,
    /// The window itself (top inventory)
    Window,
    /// The viewer's own inventory below the window
    ViewerInventory,
}

/// Borrowed view of a window event, as exposed by [`HostEvent::window_interaction`]
#[derive(Debug, Clone, Copy)]
pub enum WindowInteraction<'a> {
    Click(&'a InventoryClickEvent),
    Close(&'a InventoryCloseEvent),
}

impl WindowInteraction<'_> {
    /// The window this interaction targets
    pub fn window(&self) -> WindowId {
        match self {
            WindowInteraction::Click(click) => click.window,
            WindowInteraction::Close(close) => close.window,
        }
    }
}

// ============================================================================
// Window events
// ============================================================================

/// A click inside an open window view
#[derive(Debug)]
pub struct InventoryClickEvent {
    event_type: EventTypeDescriptor,
    /// Top window of the view
    pub window: WindowId,
    pub viewer: ViewerId,
    pub target: ClickTarget,
    /// Raw slot index within the clicked inventory, None for outside clicks
    pub slot: Option<usize>,
    pub gesture: ClickGesture,
    cancelled: AtomicBool,
}

impl InventoryClickEvent {
    pub fn new(
        event_type: EventTypeDescriptor,
        window: WindowId,
        viewer: ViewerId,
        target: ClickTarget,
        slot: Option<usize>,
        gesture: ClickGesture,
    ) -> Self {
        Self {
            event_type,
            window,
            viewer,
            target,
            slot,
            gesture,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Whether the click landed in the window's own slots
    pub fn targets_window(&self) -> bool {
        self.target == ClickTarget::Window
    }
}

impl HostEvent for InventoryClickEvent {
    fn event_type(&self) -> &EventTypeDescriptor {
        &self.event_type
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn set_cancelled(&self, cancelled: bool) {
        self.cancelled.store(cancelled, Ordering::SeqCst);
    }

    fn window_interaction(&self) -> Option<WindowInteraction<'_>> {
        Some(WindowInteraction::Click(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A viewer closed a window
#[derive(Debug)]
pub struct InventoryCloseEvent {
    event_type: EventTypeDescriptor,
    pub window: WindowId,
    pub viewer: ViewerId,
}

impl InventoryCloseEvent {
    pub fn new(event_type: EventTypeDescriptor, window: WindowId, viewer: ViewerId) -> Self {
        Self {
            event_type,
            window,
            viewer,
        }
    }
}

impl HostEvent for InventoryCloseEvent {
    fn event_type(&self) -> &EventTypeDescriptor {
        &self.event_type
    }

    fn window_interaction(&self) -> Option<WindowInteraction<'_>> {
        Some(WindowInteraction::Close(self))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
