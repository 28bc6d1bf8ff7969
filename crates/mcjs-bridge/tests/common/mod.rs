#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mcjs_bridge::{
    BridgeConfig, CallbackHandle, EventBridge, ModuleId, NativeEnvironment, ScriptEnvironment,
    ScriptValue, SubscriptionContext,
};
use mcjs_events::{
    BasicEvent, ClickGesture, ClickTarget, DynamicRegistrationApi, EventRef, EventSink,
    EventTypeDescriptor, HostError, InventoryClickEvent, InventoryCloseEvent, ItemStack,
    ListenerChain, ListenerChainApi, StaticTaxonomy, ViewerId, WindowHost, WindowId,
};

/// In-memory host: per-type listener chains plus windows
#[derive(Default)]
pub struct MockHost {
    pub chains: Mutex<HashMap<EventTypeDescriptor, Vec<Arc<dyn EventSink>>>>,
    pub dynamic_enabled: AtomicBool,
    pub installs: AtomicUsize,
    pub windows: Mutex<HashMap<WindowId, Vec<Option<ItemStack>>>>,
    pub opened: Mutex<Vec<(WindowId, ViewerId)>>,
}

impl MockHost {
    pub fn new(dynamic: bool) -> Arc<Self> {
        let host = Self::default();
        host.dynamic_enabled.store(dynamic, Ordering::SeqCst);
        Arc::new(host)
    }

    fn install(&self, event_type: &EventTypeDescriptor, sink: Arc<dyn EventSink>) {
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.chains
            .lock()
            .unwrap()
            .entry(event_type.clone())
            .or_default()
            .push(sink);
    }

    /// Fire through every chain of the event's type and its ancestors, as a host bus does
    pub fn fire(&self, event: &EventRef) {
        let sinks: Vec<Arc<dyn EventSink>> = {
            let chains = self.chains.lock().unwrap();
            event
                .event_type()
                .lineage()
                .filter_map(|t| chains.get(t))
                .flatten()
                .cloned()
                .collect()
        };
        for sink in sinks {
            sink.on_event(event);
        }
    }

    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }
}

impl DynamicRegistrationApi for MockHost {
    fn register_dynamic(
        &self,
        event_type: &EventTypeDescriptor,
        sink: Arc<dyn EventSink>,
    ) -> Result<(), HostError> {
        if !self.dynamic_enabled.load(Ordering::SeqCst) {
            return Err(HostError::Unsupported("registerEvent".to_string()));
        }
        self.install(event_type, sink);
        Ok(())
    }
}

pub struct MockChain {
    host: Arc<MockHost>,
    event_type: EventTypeDescriptor,
}

impl ListenerChain for MockChain {
    fn install(&self, sink: Arc<dyn EventSink>) -> Result<(), HostError> {
        self.host.install(&self.event_type, sink);
        Ok(())
    }
}

/// Listener-chain access over a shared [`MockHost`]
pub struct MockChains(pub Arc<MockHost>);

impl ListenerChainApi for MockChains {
    fn listener_chain(&self, event_type: &EventTypeDescriptor) -> Option<Arc<dyn ListenerChain>> {
        event_type.is_listenable().then(|| {
            Arc::new(MockChain {
                host: self.0.clone(),
                event_type: event_type.clone(),
            }) as Arc<dyn ListenerChain>
        })
    }
}

impl WindowHost for MockHost {
    fn create_window(&self, _title: &str, size: usize) -> WindowId {
        let mut windows = self.windows.lock().unwrap();
        let id = WindowId(windows.len() as u64 + 100);
        windows.insert(id, vec![None; size]);
        id
    }

    fn window_size(&self, window: WindowId) -> Option<usize> {
        self.windows.lock().unwrap().get(&window).map(Vec::len)
    }

    fn set_slot(&self, window: WindowId, slot: usize, item: Option<ItemStack>) {
        if let Some(slots) = self.windows.lock().unwrap().get_mut(&window) {
            if let Some(s) = slots.get_mut(slot) {
                *s = item;
            }
        }
    }

    fn slot(&self, window: WindowId, slot: usize) -> Option<ItemStack> {
        self.windows
            .lock()
            .unwrap()
            .get(&window)
            .and_then(|slots| slots.get(slot).cloned().flatten())
    }

    fn clear(&self, window: WindowId) {
        if let Some(slots) = self.windows.lock().unwrap().get_mut(&window) {
            slots.iter_mut().for_each(|s| *s = None);
        }
    }

    fn open(&self, window: WindowId, viewer: &ViewerId) -> Result<(), HostError> {
        if !self.windows.lock().unwrap().contains_key(&window) {
            return Err(HostError::UnknownWindow(window));
        }
        self.opened.lock().unwrap().push((window, viewer.clone()));
        Ok(())
    }
}

pub struct Harness {
    pub host: Arc<MockHost>,
    pub taxonomy: Arc<StaticTaxonomy>,
    pub bridge: EventBridge,
    pub env: Arc<NativeEnvironment>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(true, BridgeConfig::default())
    }

    pub fn with_config(dynamic: bool, config: BridgeConfig) -> Self {
        let host = MockHost::new(dynamic);
        let taxonomy = Arc::new(StaticTaxonomy::standard());
        let bridge = EventBridge::builder()
            .taxonomy(taxonomy.clone())
            .window_host(host.clone())
            .dynamic_registration(host.clone())
            .listener_chains(Arc::new(MockChains(host.clone())))
            .config(config)
            .build()
            .unwrap();
        Self {
            host,
            taxonomy,
            bridge,
            env: NativeEnvironment::new(),
        }
    }

    pub fn context(&self, module: &str) -> SubscriptionContext {
        let env: Arc<dyn ScriptEnvironment> = self.env.clone();
        SubscriptionContext::new(env, ModuleId::new(module))
    }

    pub fn event_type(&self, qualified: &str) -> EventTypeDescriptor {
        use mcjs_events::EventTaxonomy;
        self.taxonomy.lookup(qualified).unwrap()
    }

    pub fn basic(&self, qualified: &str) -> EventRef {
        Arc::new(BasicEvent::new(self.event_type(qualified)))
    }

    pub fn click(
        &self,
        window: WindowId,
        target: ClickTarget,
        slot: Option<usize>,
        gesture: ClickGesture,
    ) -> EventRef {
        Arc::new(InventoryClickEvent::new(
            self.event_type("org.bukkit.event.inventory.InventoryClickEvent"),
            window,
            ViewerId::new("steve"),
            target,
            slot,
            gesture,
        ))
    }

    pub fn close(&self, window: WindowId) -> EventRef {
        Arc::new(InventoryCloseEvent::new(
            self.event_type("org.bukkit.event.inventory.InventoryCloseEvent"),
            window,
            ViewerId::new("steve"),
        ))
    }

    /// A callback that appends `label` to `log`
    pub fn recorder(&self, log: &Log, label: &'static str) -> CallbackHandle {
        let log = log.clone();
        self.env.register(move |_| {
            log.lock().unwrap().push(label);
            Ok(())
        })
    }

    /// A callback that sets the event's cancelled flag to `cancelled`
    pub fn canceller(&self, log: &Log, label: &'static str, cancelled: bool) -> CallbackHandle {
        let log = log.clone();
        self.env.register(move |args: &[ScriptValue]| {
            log.lock().unwrap().push(label);
            if let Some(event) = args.first().and_then(ScriptValue::as_event) {
                event.set_cancelled(cancelled);
            }
            Ok(())
        })
    }
}

pub type Log = Arc<Mutex<Vec<&'static str>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}
