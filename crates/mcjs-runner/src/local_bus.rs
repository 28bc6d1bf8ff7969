// In-process host bus
// Owns the listener chains the bridge installs into and the windows it renders

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use mcjs_events::{
    BasicEvent, ClickGesture, ClickTarget, DynamicRegistrationApi, EventRef, EventSink,
    EventTaxonomy, EventTypeDescriptor, HostError, InventoryClickEvent, InventoryCloseEvent,
    ItemStack, ListenerChain, ListenerChainApi, StaticTaxonomy, ViewerId, WindowHost, WindowId,
};
use tracing::{debug, info};

const CLICK_EVENT: &str = "org.bukkit.event.inventory.InventoryClickEvent";
const CLOSE_EVENT: &str = "org.bukkit.event.inventory.InventoryCloseEvent";

type Sinks = Vec<Arc<dyn EventSink>>;

/// Per-type listener chains, shared with the chain handles given out to the bridge
#[derive(Default)]
struct ChainTable {
    chains: RwLock<HashMap<EventTypeDescriptor, Sinks>>,
    installs: AtomicUsize,
}

impl ChainTable {
    fn install(&self, event_type: &EventTypeDescriptor, sink: Arc<dyn EventSink>) {
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.chains
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.clone())
            .or_default()
            .push(sink);
        debug!(target: "runner", "Installed listener for {}", event_type);
    }

    /// Sinks for the event's type followed by each ancestor's
    fn sinks_for(&self, event_type: &EventTypeDescriptor) -> Sinks {
        let chains = self.chains.read().unwrap_or_else(PoisonError::into_inner);
        event_type
            .lineage()
            .filter_map(|t| chains.get(t))
            .flatten()
            .cloned()
            .collect()
    }
}

struct LocalChain {
    table: Arc<ChainTable>,
    event_type: EventTypeDescriptor,
}

impl ListenerChain for LocalChain {
    fn install(&self, sink: Arc<dyn EventSink>) -> Result<(), HostError> {
        self.table.install(&self.event_type, sink);
        Ok(())
    }
}

struct LocalWindow {
    title: String,
    slots: Vec<Option<ItemStack>>,
    viewers: Vec<ViewerId>,
}

/// A game-server stand-in
///
/// Firing walks the event's type and its ancestors, so a listener installed on
/// an ancestor sees subtype events too. The dynamic registration entry point
/// can be switched off to behave like an older host that only exposes
/// listener chains.
pub struct LocalEventBus {
    taxonomy: Arc<StaticTaxonomy>,
    table: Arc<ChainTable>,
    dynamic_enabled: AtomicBool,
    windows: Mutex<HashMap<WindowId, LocalWindow>>,
    next_window: AtomicU64,
}

impl LocalEventBus {
    pub fn new(taxonomy: Arc<StaticTaxonomy>, dynamic_registration: bool) -> Arc<Self> {
        Arc::new(Self {
            taxonomy,
            table: Arc::new(ChainTable::default()),
            dynamic_enabled: AtomicBool::new(dynamic_registration),
            windows: Mutex::new(HashMap::new()),
            next_window: AtomicU64::new(1),
        })
    }

    /// A bus over the standard catalogue
    pub fn standard(dynamic_registration: bool) -> Arc<Self> {
        Self::new(Arc::new(StaticTaxonomy::standard()), dynamic_registration)
    }

    pub fn taxonomy(&self) -> &Arc<StaticTaxonomy> {
        &self.taxonomy
    }

    pub fn set_dynamic_registration(&self, enabled: bool) {
        self.dynamic_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Number of listeners installed so far, across both entry points
    pub fn install_count(&self) -> usize {
        self.table.installs.load(Ordering::SeqCst)
    }

    /// Deliver an event to every listener of its type chain; returns whether it ended suppressed
    pub fn fire(&self, event: &EventRef) -> bool {
        let sinks = self.table.sinks_for(event.event_type());
        debug!(target: "runner", "Firing {} to {} listener(s)", event.event_type(), sinks.len());
        for sink in sinks {
            sink.on_event(event);
        }
        event.is_cancelled()
    }

    pub fn event_type(&self, qualified_name: &str) -> Result<EventTypeDescriptor, HostError> {
        self.taxonomy
            .lookup(qualified_name)
            .ok_or_else(|| HostError::Rejected(format!("unknown event type {}", qualified_name)))
    }

    /// A generic event of the named type with string fields
    pub fn basic_event(
        &self,
        qualified_name: &str,
        fields: &[(&str, &str)],
    ) -> Result<EventRef, HostError> {
        let event = fields
            .iter()
            .fold(BasicEvent::new(self.event_type(qualified_name)?), |event, (k, v)| {
                event.with_field(*k, *v)
            });
        Ok(Arc::new(event))
    }

    pub fn click_event(
        &self,
        window: WindowId,
        viewer: &ViewerId,
        target: ClickTarget,
        slot: Option<usize>,
        gesture: ClickGesture,
    ) -> Result<EventRef, HostError> {
        Ok(Arc::new(InventoryClickEvent::new(
            self.event_type(CLICK_EVENT)?,
            window,
            viewer.clone(),
            target,
            slot,
            gesture,
        )))
    }

    /// Closing drops the viewer from the window before the event fires
    pub fn close_event(&self, window: WindowId, viewer: &ViewerId) -> Result<EventRef, HostError> {
        if let Some(w) = self.lock_windows().get_mut(&window) {
            w.viewers.retain(|v| v != viewer);
        }
        Ok(Arc::new(InventoryCloseEvent::new(
            self.event_type(CLOSE_EVENT)?,
            window,
            viewer.clone(),
        )))
    }

    pub fn window_title(&self, window: WindowId) -> Option<String> {
        self.lock_windows().get(&window).map(|w| w.title.clone())
    }

    pub fn viewers(&self, window: WindowId) -> Vec<ViewerId> {
        self.lock_windows()
            .get(&window)
            .map(|w| w.viewers.clone())
            .unwrap_or_default()
    }

    /// Rendered slot contents of a window
    pub fn rendered(&self, window: WindowId) -> Vec<Option<ItemStack>> {
        self.lock_windows()
            .get(&window)
            .map(|w| w.slots.clone())
            .unwrap_or_default()
    }

    fn lock_windows(&self) -> std::sync::MutexGuard<'_, HashMap<WindowId, LocalWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DynamicRegistrationApi for LocalEventBus {
    fn register_dynamic(
        &self,
        event_type: &EventTypeDescriptor,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), HostError> {
        if !self.dynamic_enabled.load(Ordering::SeqCst) {
            return Err(HostError::Unsupported("dynamic registration".to_string()));
        }
        self.table.install(event_type, sink);
        Ok(())
    }
}

impl ListenerChainApi for LocalEventBus {
    fn listener_chain(&self, event_type: &EventTypeDescriptor) -> Option<Arc<dyn ListenerChain>> {
        if !event_type.is_listenable() {
            return None;
        }
        Some(Arc::new(LocalChain {
            table: self.table.clone(),
            event_type: event_type.clone(),
        }))
    }
}

impl WindowHost for LocalEventBus {
    fn create_window(&self, title: &str, size: usize) -> WindowId {
        let id = WindowId(self.next_window.fetch_add(1, Ordering::SeqCst));
        self.lock_windows().insert(
            id,
            LocalWindow {
                title: title.to_string(),
                slots: vec![None; size],
                viewers: Vec::new(),
            },
        );
        id
    }

    fn window_size(&self, window: WindowId) -> Option<usize> {
        self.lock_windows().get(&window).map(|w| w.slots.len())
    }

    fn set_slot(&self, window: WindowId, slot: usize, item: Option<ItemStack>) {
        if let Some(s) = self
            .lock_windows()
            .get_mut(&window)
            .and_then(|w| w.slots.get_mut(slot))
        {
            *s = item;
        }
    }

    fn slot(&self, window: WindowId, slot: usize) -> Option<ItemStack> {
        self.lock_windows()
            .get(&window)
            .and_then(|w| w.slots.get(slot).cloned().flatten())
    }

    fn clear(&self, window: WindowId) {
        if let Some(w) = self.lock_windows().get_mut(&window) {
            w.slots.iter_mut().for_each(|s| *s = None);
        }
    }

    fn open(&self, window: WindowId, viewer: &ViewerId) -> Result<(), HostError> {
        let mut windows = self.lock_windows();
        let w = windows
            .get_mut(&window)
            .ok_or(HostError::UnknownWindow(window))?;
        if !w.viewers.contains(viewer) {
            w.viewers.push(viewer.clone());
        }
        info!(target: "runner", "{} opened '{}' ({})", viewer, w.title, window);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(AtomicUsize);

    impl EventSink for Counter {
        fn on_event(&self, _event: &EventRef) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_fire_walks_ancestors() {
        let bus = LocalEventBus::standard(true);
        let exp = bus.event_type("org.bukkit.event.block.BlockExpEvent").unwrap();
        let brk = bus.event_type("org.bukkit.event.block.BlockBreakEvent").unwrap();
        let counter = Arc::new(Counter(AtomicUsize::new(0)));

        bus.register_dynamic(&exp, counter.clone()).unwrap();
        bus.fire(&bus.basic_event(brk.qualified_name(), &[]).unwrap());
        bus.fire(&bus.basic_event(exp.qualified_name(), &[]).unwrap());
        bus.fire(&bus.basic_event("org.bukkit.event.block.BlockPlaceEvent", &[]).unwrap());

        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dynamic_toggle() {
        let bus = LocalEventBus::standard(false);
        let join = bus.event_type("org.bukkit.event.player.PlayerJoinEvent").unwrap();
        let sink = Arc::new(Counter(AtomicUsize::new(0)));

        assert!(bus.register_dynamic(&join, sink.clone()).is_err());
        bus.listener_chain(&join).unwrap().install(sink.clone()).unwrap();
        assert_eq!(bus.install_count(), 1);

        bus.set_dynamic_registration(true);
        bus.register_dynamic(&join, sink).unwrap();
        assert_eq!(bus.install_count(), 2);
    }

    #[test]
    fn test_categories_have_no_chain() {
        let bus = LocalEventBus::standard(false);
        let player = bus.event_type("org.bukkit.event.player.PlayerEvent").unwrap();
        assert!(bus.listener_chain(&player).is_none());
    }

    #[test]
    fn test_windows_render_and_track_viewers() {
        let bus = LocalEventBus::standard(true);
        let steve = ViewerId::new("steve");
        let id = bus.create_window("Shop", 9);

        bus.set_slot(id, 2, Some(ItemStack::new("apple", 1)));
        bus.set_slot(id, 99, Some(ItemStack::new("apple", 1)));
        assert_eq!(bus.slot(id, 2), Some(ItemStack::new("apple", 1)));
        assert_eq!(bus.rendered(id).iter().filter(|s| s.is_some()).count(), 1);

        bus.open(id, &steve).unwrap();
        assert_eq!(bus.viewers(id), vec![steve.clone()]);
        bus.close_event(id, &steve).unwrap();
        assert!(bus.viewers(id).is_empty());

        assert_eq!(
            bus.open(WindowId(404), &steve),
            Err(HostError::UnknownWindow(WindowId(404)))
        );
        assert_eq!(bus.window_title(id).as_deref(), Some("Shop"));
    }
}
