use std::sync::Arc;

use mcjs_events::{HostError, ItemStack, ViewerId, WindowHost, WindowId};
use tracing::debug;

use crate::gui::session::{GuiSession, SessionState};

/// Script-facing handle to a materialized window
///
/// Item mutations return false once the window has been closed. Reads go to
/// the host and stay valid after close.
#[derive(Clone)]
pub struct WindowHandle {
    session: Arc<GuiSession>,
    host: Arc<dyn WindowHost>,
}

impl WindowHandle {
    pub(crate) fn new(session: Arc<GuiSession>, host: Arc<dyn WindowHost>) -> Self {
        Self { session, host }
    }

    pub fn id(&self) -> WindowId {
        self.session.window()
    }

    pub fn title(&self) -> &str {
        self.session.title()
    }

    pub fn size(&self) -> usize {
        self.session.size()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    pub fn session(&self) -> &Arc<GuiSession> {
        &self.session
    }

    /// Show the window to a viewer
    pub fn open(&self, viewer: &ViewerId) -> Result<(), HostError> {
        if self.is_closed() {
            return Err(HostError::Rejected(format!("{} is closed", self.id())));
        }
        self.host.open(self.id(), viewer)
    }

    /// Replace or empty one slot
    pub fn update_item(&self, slot: usize, item: Option<ItemStack>) -> bool {
        if !self.session.store_item(slot, item.clone()) {
            return false;
        }
        self.host.set_slot(self.id(), slot, item);
        true
    }

    pub fn get_item(&self, slot: usize) -> Option<ItemStack> {
        if slot >= self.size() {
            return None;
        }
        self.host.slot(self.id(), slot)
    }

    /// Empty the rendered window; [`WindowHandle::refresh`] restores the stored layout
    pub fn clear(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.host.clear(self.id());
        true
    }

    /// Place `item` in the first empty slot; false when full or closed
    pub fn add_item(&self, item: ItemStack) -> bool {
        match self.first_empty_slot() {
            Some(slot) => self.update_item(slot, Some(item)),
            None => false,
        }
    }

    /// Take `item.amount` similar items out of the window, scanning from the first slot
    ///
    /// Removes as many as it finds; true only if the full amount was removed.
    pub fn remove_item(&self, item: &ItemStack) -> bool {
        if self.is_closed() {
            return false;
        }

        let mut remaining = item.amount;
        for slot in 0..self.size() {
            if remaining == 0 {
                break;
            }
            let Some(mut stack) = self.get_item(slot).filter(|s| s.is_similar(item)) else {
                continue;
            };
            let taken = stack.amount.min(remaining);
            remaining -= taken;
            stack.amount -= taken;
            if !self.update_item(slot, (stack.amount > 0).then_some(stack)) {
                return false;
            }
        }
        remaining == 0
    }

    /// Whether some slot holds exactly `item`, amount included
    pub fn contains(&self, item: &ItemStack) -> bool {
        (0..self.size()).any(|slot| self.get_item(slot).as_ref() == Some(item))
    }

    /// Whether similar stacks add up to at least `amount`
    pub fn contains_at_least(&self, item: &ItemStack, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        let total: u32 = (0..self.size())
            .filter_map(|slot| self.get_item(slot))
            .filter(|stack| stack.is_similar(item))
            .map(|stack| stack.amount)
            .sum();
        total >= amount
    }

    /// Put `item` in every slot
    pub fn fill(&self, item: ItemStack) -> bool {
        self.fill_range(item, 0, self.size())
    }

    /// Put `item` in slots `start..=end`, clamped to the window
    ///
    /// False once closed or when `start` is past the last slot.
    pub fn fill_range(&self, item: ItemStack, start: usize, end: usize) -> bool {
        if self.is_closed() || start >= self.size() {
            return false;
        }
        let end = end.min(self.size() - 1);
        (start..=end).all(|slot| self.update_item(slot, Some(item.clone())))
    }

    /// Out-of-range slots count as empty
    pub fn is_slot_empty(&self, slot: usize) -> bool {
        self.get_item(slot).is_none()
    }

    pub fn first_empty_slot(&self) -> Option<usize> {
        (0..self.size()).find(|slot| self.is_slot_empty(*slot))
    }

    pub fn set_data(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.session.set_data(key, value)
    }

    pub fn get_data(&self, key: &str) -> Option<String> {
        self.session.data(key)
    }

    pub fn remove_data(&self, key: &str) -> Option<String> {
        self.session.remove_data(key)
    }

    /// Re-apply the last-known contents and background; false when closed
    pub fn refresh(&self) -> bool {
        apply_layout(self.host.as_ref(), &self.session)
    }
}

impl std::fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowHandle")
            .field("window", &self.id())
            .field("title", &self.title())
            .field("state", &self.state())
            .finish()
    }
}

/// Clear the host window and render the session's stored layout into it
pub(crate) fn apply_layout(host: &dyn WindowHost, session: &GuiSession) -> bool {
    if session.is_closed() {
        return false;
    }

    let window = session.window();
    let (items, background) = session.layout();
    host.clear(window);
    for (slot, item) in items {
        if slot < session.size() {
            host.set_slot(window, slot, Some(item));
        }
    }
    if let Some(background) = background {
        for slot in 0..session.size() {
            if host.slot(window, slot).is_none() {
                host.set_slot(window, slot, Some(background.clone()));
            }
        }
    }
    debug!(target: "gui", "Rendered layout of {}", window);
    true
}
