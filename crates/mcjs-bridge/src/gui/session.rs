use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mcjs_events::{ItemStack, WindowId};

use crate::context::{CallbackHandle, SubscriptionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
    /// Callbacks and layout have been discarded
    Released,
}

/// Everything a builder accumulates before the window is materialized
#[derive(Debug, Clone, Default)]
pub struct WindowLayout {
    pub title: String,
    pub size: usize,
    pub items: BTreeMap<usize, ItemStack>,
    pub background: Option<ItemStack>,
    pub slot_callbacks: HashMap<usize, CallbackHandle>,
    pub global_callback: Option<CallbackHandle>,
    pub close_callback: Option<CallbackHandle>,
    pub allow_item_removal: bool,
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    items: BTreeMap<usize, ItemStack>,
    background: Option<ItemStack>,
    slot_callbacks: HashMap<usize, CallbackHandle>,
    global_callback: Option<CallbackHandle>,
    close_callback: Option<CallbackHandle>,
    allow_item_removal: bool,
    data: HashMap<String, String>,
}

/// Live state of one materialized window
#[derive(Debug)]
pub struct GuiSession {
    window: WindowId,
    title: String,
    size: usize,
    owner: SubscriptionContext,
    inner: Mutex<SessionInner>,
}

impl GuiSession {
    pub(crate) fn new(window: WindowId, owner: SubscriptionContext, layout: WindowLayout) -> Self {
        Self {
            window,
            title: layout.title,
            size: layout.size,
            owner,
            inner: Mutex::new(SessionInner {
                state: SessionState::Open,
                items: layout.items,
                background: layout.background,
                slot_callbacks: layout.slot_callbacks,
                global_callback: layout.global_callback,
                close_callback: layout.close_callback,
                allow_item_removal: layout.allow_item_removal,
                data: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn owner(&self) -> &SubscriptionContext {
        &self.owner
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// True once closed, including after release
    pub fn is_closed(&self) -> bool {
        self.state() != SessionState::Open
    }

    pub fn allows_item_removal(&self) -> bool {
        self.lock().allow_item_removal
    }

    pub fn slot_callback(&self, slot: usize) -> Option<CallbackHandle> {
        self.lock().slot_callbacks.get(&slot).copied()
    }

    pub fn global_callback(&self) -> Option<CallbackHandle> {
        self.lock().global_callback
    }

    /// Transition Open -> Closed, handing back the close callback
    ///
    /// Returns None for the state change if the session was already closed.
    pub(crate) fn mark_closed(&self) -> Option<Option<CallbackHandle>> {
        let mut inner = self.lock();
        if inner.state != SessionState::Open {
            return None;
        }
        inner.state = SessionState::Closed;
        Some(inner.close_callback)
    }

    /// Discard callbacks, layout and script data
    pub(crate) fn release(&self) {
        let mut inner = self.lock();
        inner.state = SessionState::Released;
        inner.items.clear();
        inner.background = None;
        inner.slot_callbacks.clear();
        inner.global_callback = None;
        inner.close_callback = None;
        inner.data.clear();
    }

    /// Last-known slot contents and background filler
    pub fn layout(&self) -> (BTreeMap<usize, ItemStack>, Option<ItemStack>) {
        let inner = self.lock();
        (inner.items.clone(), inner.background.clone())
    }

    /// Record a slot change in the stored layout; false once closed
    pub(crate) fn store_item(&self, slot: usize, item: Option<ItemStack>) -> bool {
        let mut inner = self.lock();
        if inner.state != SessionState::Open || slot >= self.size {
            return false;
        }
        match item {
            Some(item) => inner.items.insert(slot, item),
            None => inner.items.remove(&slot),
        };
        true
    }

    /// Store script data; false once closed
    pub fn set_data(&self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let mut inner = self.lock();
        if inner.state != SessionState::Open {
            return false;
        }
        inner.data.insert(key.into(), value.into());
        true
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.lock().data.get(key).cloned()
    }

    pub fn remove_data(&self, key: &str) -> Option<String> {
        self.lock().data.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ModuleId, NativeEnvironment};

    fn session() -> GuiSession {
        let owner = SubscriptionContext::new(NativeEnvironment::new(), ModuleId::new("shop"));
        let mut layout = WindowLayout {
            title: "Shop".to_string(),
            size: 9,
            close_callback: Some(CallbackHandle(9)),
            ..Default::default()
        };
        layout.items.insert(0, ItemStack::new("apple", 1));
        layout.slot_callbacks.insert(0, CallbackHandle(1));
        GuiSession::new(WindowId(1), owner, layout)
    }

    #[test]
    fn test_close_once() {
        let session = session();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.mark_closed(), Some(Some(CallbackHandle(9))));
        assert_eq!(session.mark_closed(), None);
        assert!(session.is_closed());
    }

    #[test]
    fn test_closed_session_rejects_mutation() {
        let session = session();
        assert!(session.store_item(1, Some(ItemStack::new("bread", 2))));
        assert!(!session.store_item(9, Some(ItemStack::new("bread", 2))));

        session.mark_closed();
        assert!(!session.store_item(2, Some(ItemStack::new("bread", 2))));

        let (items, _) = session.layout();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_closed_session_rejects_data() {
        let session = session();
        assert!(session.set_data("page", "1"));

        session.mark_closed();
        assert!(!session.set_data("page", "2"));
        assert_eq!(session.data("page"), Some("1".to_string()));
    }

    #[test]
    fn test_release_discards_everything() {
        let session = session();
        session.set_data("page", "2");
        session.mark_closed();
        session.release();

        assert_eq!(session.state(), SessionState::Released);
        assert_eq!(session.slot_callback(0), None);
        assert_eq!(session.data("page"), None);
        assert!(!session.set_data("page", "3"));
        assert!(session.layout().0.is_empty());
    }
}
