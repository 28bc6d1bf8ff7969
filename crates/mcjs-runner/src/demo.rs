// Native demo modules and a replayed play session against the local bus

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Context;
use mcjs_bridge::{
    BridgeConfig, DispatchOutcome, EventBridge, ModuleId, NativeEnvironment, ScriptError,
    ScriptEnvironment, ScriptValue, SubscriptionContext, WindowHandle,
};
use mcjs_events::{BasicEvent, ClickGesture, ClickTarget, EventPriority, ItemStack, ViewerId, WindowId};
use tracing::info;

pub const GREETER: &str = "greeter";
pub const GUARD: &str = "guard";
pub const MINER: &str = "miner";
pub const BROKEN: &str = "broken";
pub const SHOP: &str = "shop";

/// Slot of the item the shop sells
pub const SHOP_OFFER_SLOT: usize = 13;

type Transcript = Arc<Mutex<Vec<String>>>;

/// What a scenario run produced
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Lines written by module callbacks, in execution order
    pub transcript: Vec<String>,
    /// (block, suppressed) per break attempt
    pub block_breaks: Vec<(String, bool)>,
    pub shop: WindowId,
}

/// A handful of modules written against the bridge as native closures
pub struct DemoModules {
    bus: Arc<crate::LocalEventBus>,
    bridge: EventBridge,
    env: Arc<NativeEnvironment>,
    transcript: Transcript,
}

impl DemoModules {
    pub fn new(bus: Arc<crate::LocalEventBus>, config: BridgeConfig) -> anyhow::Result<Self> {
        let bridge = EventBridge::builder()
            .taxonomy(bus.taxonomy().clone())
            .window_host(bus.clone())
            .dynamic_registration(bus.clone())
            .listener_chains(bus.clone())
            .config(config)
            .build()
            .context("Failed to build event bridge")?;

        Ok(Self {
            bus,
            bridge,
            env: NativeEnvironment::new(),
            transcript: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn bridge(&self) -> &EventBridge {
        &self.bridge
    }

    pub fn bus(&self) -> &Arc<crate::LocalEventBus> {
        &self.bus
    }

    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn context(&self, module: &str) -> SubscriptionContext {
        let env: Arc<dyn ScriptEnvironment> = self.env.clone();
        SubscriptionContext::new(env, ModuleId::new(module))
    }

    /// Register every demo module's handlers
    pub fn load(&self) -> anyhow::Result<()> {
        let greeter = self.context(GREETER);
        let out = self.transcript.clone();
        let welcome = self.env.register(move |args| {
            let player = field(args, "player").unwrap_or_default();
            say(&out, format!("Welcome, {}!", player));
            Ok(())
        });
        self.bridge
            .register_event(&greeter, "PlayerJoinEvent", welcome, EventPriority::Normal)?;

        let out = self.transcript.clone();
        let goodbye = self.env.register(move |args| {
            let player = field(args, "player").unwrap_or_default();
            say(&out, format!("Goodbye, {}", player));
            Ok(())
        });
        self.bridge
            .register_event(&greeter, "player.PlayerQuitEvent", goodbye, EventPriority::Normal)?;

        // Protects bedrock; runs before the miner observes the outcome
        let guard = self.context(GUARD);
        let out = self.transcript.clone();
        let protect = self.env.register(move |args| {
            if field(args, "block").as_deref() == Some("bedrock") {
                if let Some(event) = args.first().and_then(ScriptValue::as_event) {
                    event.set_cancelled(true);
                }
                say(&out, "guard: bedrock is protected".to_string());
            }
            Ok(())
        });
        self.bridge
            .register_event(&guard, "block.BlockBreakEvent", protect, EventPriority::High)?;

        // Subscribes to the ancestor, so it sees every break too
        let miner = self.context(MINER);
        let out = self.transcript.clone();
        let observe = self.env.register(move |args| {
            let block = field(args, "block").unwrap_or_default();
            let suppressed = args
                .first()
                .and_then(ScriptValue::as_event)
                .is_some_and(|e| e.is_cancelled());
            say(&out, format!("miner: {} (suppressed: {})", block, suppressed));
            Ok(())
        });
        self.bridge
            .register_event(&miner, "BlockExpEvent", observe, EventPriority::Monitor)?;

        let broken = self.context(BROKEN);
        let fail = self
            .env
            .register(|_| Err(ScriptError::Failed("undefined is not a function".to_string())));
        self.bridge
            .register_event(&broken, "PlayerQuitEvent", fail, EventPriority::Lowest)?;

        info!(target: "runner", "Loaded demo modules ({} handlers)", self.bridge.handler_count());
        Ok(())
    }

    /// Build the shop window and show it to `viewer`
    pub fn open_shop(&self, viewer: &ViewerId) -> anyhow::Result<WindowHandle> {
        let shop = self.context(SHOP);

        let out = self.transcript.clone();
        let buyer = viewer.clone();
        let buy = self.env.register(move |_| {
            say(&out, format!("shop: {} bought a diamond", buyer));
            Ok(())
        });
        let out = self.transcript.clone();
        let browse = self.env.register(move |args| {
            let window = args.iter().find_map(|a| match a {
                ScriptValue::Window(id) => Some(*id),
                _ => None,
            });
            if let Some(window) = window {
                say(&out, format!("shop: nothing for sale there ({})", window));
            }
            Ok(())
        });
        let out = self.transcript.clone();
        let closed = self.env.register(move |_| {
            say(&out, "shop: come again".to_string());
            Ok(())
        });

        let window = self
            .bridge
            .create_window(&shop, "Shop", 3)?
            .fill_borders(ItemStack::new("black_stained_glass_pane", 1).named(" "))
            .set_item_with(
                SHOP_OFFER_SLOT,
                ItemStack::new("diamond", 1).named("Diamond (5 emeralds)"),
                buy,
            )
            .on_click(browse)
            .on_close(closed)
            .open(viewer)?;
        Ok(window)
    }

    /// Replay a short play session through the local bus
    pub fn run_scenario(&self) -> anyhow::Result<ScenarioReport> {
        let steve = ViewerId::new("steve");
        let player = steve.0.as_str();

        self.bus
            .fire(&self.bus.basic_event("org.bukkit.event.player.PlayerJoinEvent", &[("player", player)])?);

        let mut block_breaks = Vec::new();
        for block in ["stone", "bedrock"] {
            let event = self.bus.basic_event(
                "org.bukkit.event.block.BlockBreakEvent",
                &[("player", player), ("block", block)],
            )?;
            block_breaks.push((block.to_string(), self.bus.fire(&event)));
        }

        let shop = self.open_shop(&steve)?;
        let clicks = [
            (ClickTarget::Window, Some(SHOP_OFFER_SLOT), ClickGesture::Left),
            (ClickTarget::Window, Some(0), ClickGesture::Left),
            (ClickTarget::Window, Some(SHOP_OFFER_SLOT), ClickGesture::MoveToOtherInventory),
            (ClickTarget::Outside, None, ClickGesture::Left),
        ];
        for (target, slot, gesture) in clicks {
            let click = self.bus.click_event(shop.id(), &steve, target, slot, gesture)?;
            self.bus.fire(&click);
        }
        self.bus.fire(&self.bus.close_event(shop.id(), &steve)?);

        self.bus
            .fire(&self.bus.basic_event("org.bukkit.event.player.PlayerQuitEvent", &[("player", player)])?);

        Ok(ScenarioReport {
            transcript: self.transcript(),
            block_breaks,
            shop: shop.id(),
        })
    }

    /// Unload one module; returns the number of handlers removed
    pub fn unload(&self, module: &str) -> usize {
        self.bridge.unregister_module(&ModuleId::new(module))
    }

    /// Fire a generic event and report how the bridge handled it
    pub fn dispatch_named(
        &self,
        qualified_name: &str,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<DispatchOutcome> {
        let event = self.bus.basic_event(qualified_name, fields)?;
        Ok(self.bridge.dispatch(&event))
    }
}

fn field(args: &[ScriptValue], key: &str) -> Option<String> {
    args.first()
        .and_then(ScriptValue::as_event)
        .and_then(|event| event.as_any().downcast_ref::<BasicEvent>())
        .and_then(|event| event.field(key))
        .map(str::to_string)
}

fn say(transcript: &Transcript, line: String) {
    info!(target: "runner", "{}", line);
    transcript
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(line);
}
