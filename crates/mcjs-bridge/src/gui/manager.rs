use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use mcjs_events::{
    ClickGesture, ClickTarget, EventRef, InventoryClickEvent, InventoryCloseEvent, WindowHost,
    WindowId, WindowInteraction,
};
use tracing::{debug, error, info, warn};

use crate::context::{CallbackHandle, ModuleId, ScriptValue, SubscriptionContext};
use crate::gui::handle::{apply_layout, WindowHandle};
use crate::gui::session::{GuiSession, WindowLayout};
use crate::scheduler::TaskScheduler;
use crate::timeout::TimeoutGuard;

/// What the session manager did with a window event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRouting {
    /// Not a window event, or no session tracks the window
    Unmanaged,
    /// Outside click, plain click in the viewer's inventory, or closed window
    Ignored,
    /// Move-to-other-inventory suppressed because removal is disallowed
    Blocked,
    SlotCallback(usize),
    GlobalCallback,
    /// Managed click with no callback to run
    NoCallback,
    Closed,
}

/// Tracks materialized windows and routes their click and close events
pub struct SessionManager {
    host: Arc<dyn WindowHost>,
    sessions: RwLock<HashMap<WindowId, Arc<GuiSession>>>,
    releases: Mutex<TaskScheduler<WindowId>>,
    guard: TimeoutGuard,
    release_delay: Duration,
}

impl SessionManager {
    pub fn new(host: Arc<dyn WindowHost>, guard: TimeoutGuard, release_delay: Duration) -> Self {
        Self {
            host,
            sessions: RwLock::new(HashMap::new()),
            releases: Mutex::new(TaskScheduler::new()),
            guard,
            release_delay,
        }
    }

    pub(crate) fn materialize(&self, owner: SubscriptionContext, layout: WindowLayout) -> WindowHandle {
        let window = self.host.create_window(&layout.title, layout.size);
        let session = Arc::new(GuiSession::new(window, owner, layout));
        apply_layout(self.host.as_ref(), &session);

        info!(target: "gui", "Created window {} '{}' ({} slots) for '{}'",
            window, session.title(), session.size(), session.owner().module());
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(window, session.clone());
        WindowHandle::new(session, self.host.clone())
    }

    pub fn session(&self, window: WindowId) -> Option<Arc<GuiSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&window)
            .cloned()
    }

    pub fn handle(&self, window: WindowId) -> Option<WindowHandle> {
        self.session(window)
            .map(|session| WindowHandle::new(session, self.host.clone()))
    }

    pub fn is_managed(&self, window: WindowId) -> bool {
        self.session(window).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Route a window click or close event to its session
    pub fn route(&self, event: &EventRef) -> WindowRouting {
        match event.window_interaction() {
            Some(WindowInteraction::Click(click)) => self.handle_click(event, click),
            Some(WindowInteraction::Close(close)) => self.handle_close(event, close),
            None => WindowRouting::Unmanaged,
        }
    }

    pub fn handle_click(&self, event: &EventRef, click: &InventoryClickEvent) -> WindowRouting {
        let Some(session) = self.session(click.window) else {
            return WindowRouting::Unmanaged;
        };
        if session.is_closed() {
            return WindowRouting::Ignored;
        }

        let own_slots = match click.target {
            ClickTarget::Outside => return WindowRouting::Ignored,
            ClickTarget::ViewerInventory if !click.gesture.is_shift_click() => {
                return WindowRouting::Ignored
            }
            ClickTarget::ViewerInventory => false,
            ClickTarget::Window => true,
        };

        let allow_removal = session.allows_item_removal();
        if click.gesture == ClickGesture::MoveToOtherInventory && !allow_removal {
            event.set_cancelled(true);
            debug!(target: "gui", "Blocked move-to-other-inventory in {}", click.window);
            return WindowRouting::Blocked;
        }

        // Handlers may un-suppress
        if own_slots && !allow_removal {
            event.set_cancelled(true);
        }

        let slot_callback = click
            .slot
            .filter(|_| own_slots)
            .and_then(|slot| session.slot_callback(slot).map(|cb| (slot, cb)));
        if let Some((slot, callback)) = slot_callback {
            self.invoke(&session, callback, event, "click");
            return WindowRouting::SlotCallback(slot);
        }

        match session.global_callback() {
            Some(callback) => {
                self.invoke(&session, callback, event, "click");
                WindowRouting::GlobalCallback
            }
            None => WindowRouting::NoCallback,
        }
    }

    pub fn handle_close(&self, event: &EventRef, close: &InventoryCloseEvent) -> WindowRouting {
        let Some(session) = self.session(close.window) else {
            return WindowRouting::Unmanaged;
        };
        let Some(close_callback) = session.mark_closed() else {
            return WindowRouting::Ignored;
        };

        debug!(target: "gui", "{} closed by {}", close.window, close.viewer);
        if let Some(callback) = close_callback {
            self.invoke(&session, callback, event, "close");
        }

        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .schedule(self.release_delay, close.window);
        WindowRouting::Closed
    }

    /// Re-apply the stored layout of a window; false if unknown or closed
    pub fn refresh(&self, window: WindowId) -> bool {
        self.session(window)
            .map(|session| apply_layout(self.host.as_ref(), &session))
            .unwrap_or(false)
    }

    /// Release sessions whose grace delay has passed; returns how many
    pub fn tick(&self, now: Instant) -> usize {
        let due = self
            .releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tick(now);
        due.into_iter().filter(|window| self.release(*window)).count()
    }

    /// Drop a session's callbacks and stop tracking it
    pub fn release(&self, window: WindowId) -> bool {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&window);
        match removed {
            Some(session) => {
                session.release();
                debug!(target: "gui", "Released {}", window);
                true
            }
            None => false,
        }
    }

    /// Release every session a module owns
    pub fn release_module(&self, module: &ModuleId) -> usize {
        let owned: Vec<WindowId> = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|session| session.owner().module() == module)
            .map(|session| session.window())
            .collect();
        owned.into_iter().filter(|window| self.release(*window)).count()
    }

    pub fn release_all(&self) -> usize {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain();
        let sessions: Vec<_> = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        for (_, session) in &sessions {
            session.release();
        }
        sessions.len()
    }

    pub fn pending_releases(&self) -> usize {
        self.releases
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_count()
    }

    fn invoke(&self, session: &GuiSession, callback: CallbackHandle, event: &EventRef, kind: &str) {
        let args = vec![
            ScriptValue::Event(event.clone()),
            ScriptValue::Window(session.window()),
        ];
        match self.guard.run_bounded(session.owner().environment(), callback, args) {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                warn!(target: "gui", "Inventory {} handler of '{}' for {}: {}",
                    kind, session.owner().module(), session.window(), e);
            }
            Err(e) => {
                error!(target: "gui", "Error in inventory {} handler of '{}' for {}: {}",
                    kind, session.owner().module(), session.window(), e);
            }
        }
    }
}
