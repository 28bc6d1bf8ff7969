use std::sync::Arc;

use mcjs_events::{HostError, ItemStack, ViewerId, ROW_SIZE};

use crate::context::{CallbackHandle, SubscriptionContext};
use crate::gui::handle::WindowHandle;
use crate::gui::manager::SessionManager;
use crate::gui::session::WindowLayout;
use crate::gui::MAX_ROWS;

/// Accumulates a window's layout and callbacks before it is materialized
///
/// Slots outside the window are ignored.
pub struct WindowBuilder {
    manager: Arc<SessionManager>,
    owner: SubscriptionContext,
    layout: WindowLayout,
}

impl WindowBuilder {
    /// `rows` is clamped to 1..=6
    pub(crate) fn new(
        manager: Arc<SessionManager>,
        owner: SubscriptionContext,
        title: impl Into<String>,
        rows: usize,
    ) -> Self {
        let rows = rows.clamp(1, MAX_ROWS);
        Self {
            manager,
            owner,
            layout: WindowLayout {
                title: title.into(),
                size: rows * ROW_SIZE,
                ..Default::default()
            },
        }
    }

    pub fn size(&self) -> usize {
        self.layout.size
    }

    pub fn rows(&self) -> usize {
        self.layout.size / ROW_SIZE
    }

    pub fn set_item(mut self, slot: usize, item: ItemStack) -> Self {
        if slot < self.layout.size {
            self.layout.items.insert(slot, item);
        }
        self
    }

    /// Place an item and attach a click callback for its slot
    pub fn set_item_with(mut self, slot: usize, item: ItemStack, on_click: CallbackHandle) -> Self {
        if slot < self.layout.size {
            self.layout.items.insert(slot, item);
            self.layout.slot_callbacks.insert(slot, on_click);
        }
        self
    }

    /// Place `item` in every slot from `start` to `end` inclusive
    pub fn set_items(mut self, start: usize, end: usize, item: ItemStack) -> Self {
        let end = end.min(self.layout.size.saturating_sub(1));
        for slot in start..=end {
            self.layout.items.insert(slot, item.clone());
        }
        self
    }

    /// Use `item` as background and put it in every slot not yet set
    pub fn fill(mut self, item: ItemStack) -> Self {
        for slot in 0..self.layout.size {
            self.layout.items.entry(slot).or_insert_with(|| item.clone());
        }
        self.layout.background = Some(item);
        self
    }

    /// Overwrite the outer ring of slots with `item`
    pub fn fill_borders(mut self, item: ItemStack) -> Self {
        let size = self.layout.size;
        let border = (0..size).filter(|slot| {
            let (row, col) = (slot / ROW_SIZE, slot % ROW_SIZE);
            row == 0 || row == size / ROW_SIZE - 1 || col == 0 || col == ROW_SIZE - 1
        });
        for slot in border {
            self.layout.items.insert(slot, item.clone());
        }
        self
    }

    /// Filler for slots that end up empty when the window is rendered
    pub fn set_background(mut self, item: ItemStack) -> Self {
        self.layout.background = Some(item);
        self
    }

    /// Callback for clicks no slot callback handles
    pub fn on_click(mut self, callback: CallbackHandle) -> Self {
        self.layout.global_callback = Some(callback);
        self
    }

    pub fn on_close(mut self, callback: CallbackHandle) -> Self {
        self.layout.close_callback = Some(callback);
        self
    }

    /// Whether viewers may take items out of the window (default: false)
    pub fn set_allow_item_removal(mut self, allow: bool) -> Self {
        self.layout.allow_item_removal = allow;
        self
    }

    /// Materialize the window with the host and start tracking it
    pub fn build(mut self) -> WindowHandle {
        // Background becomes part of the stored layout so refresh restores it
        if let Some(background) = self.layout.background.clone() {
            for slot in 0..self.layout.size {
                self.layout
                    .items
                    .entry(slot)
                    .or_insert_with(|| background.clone());
            }
        }
        self.manager.materialize(self.owner, self.layout)
    }

    /// Build and show to a viewer
    pub fn open(self, viewer: &ViewerId) -> Result<WindowHandle, HostError> {
        let handle = self.build();
        handle.open(viewer)?;
        Ok(handle)
    }
}
