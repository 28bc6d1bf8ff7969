// Integration tests for script-built windows

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::{entries, log, Harness};
use mcjs_bridge::{
    BridgeConfig, DispatchOutcome, ModuleId, SessionState, WindowHandle, WindowRouting,
};
use mcjs_events::{ClickGesture, ClickTarget, EventPriority, ItemStack, ViewerId};

fn apple() -> ItemStack {
    ItemStack::new("apple", 1)
}

fn steve() -> ViewerId {
    ViewerId::new("steve")
}

#[test]
fn test_shop_scenario() {
    let h = Harness::new();
    let log = log();
    let ctx = h.context("shop");

    let window = h
        .bridge
        .create_window(&ctx, "Shop", 3)
        .unwrap()
        .set_item_with(0, apple(), h.recorder(&log, "on_buy"))
        .open(&steve())
        .unwrap();
    assert_eq!(window.size(), 27);
    assert_eq!(h.host.opened.lock().unwrap().len(), 1);
    // Click and close types are bridged for windows
    assert_eq!(h.host.install_count(), 2);

    h.host.fire(&h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left));
    assert_eq!(entries(&log), vec!["on_buy"]);

    // No global callback: nothing runs
    h.host.fire(&h.click(window.id(), ClickTarget::Window, Some(5), ClickGesture::Left));
    assert_eq!(entries(&log), vec!["on_buy"]);
}

#[test]
fn test_global_callback_for_other_slots() {
    let h = Harness::new();
    let log = log();
    let ctx = h.context("shop");

    let window = h
        .bridge
        .create_window(&ctx, "Shop", 3)
        .unwrap()
        .set_item_with(0, apple(), h.recorder(&log, "on_buy"))
        .on_click(h.recorder(&log, "global"))
        .build();

    let outcome = h.bridge.dispatch(&h.click(window.id(), ClickTarget::Window, Some(5), ClickGesture::Left));
    assert_eq!(outcome, DispatchOutcome::Window(WindowRouting::GlobalCallback));
    let outcome = h.bridge.dispatch(&h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Right));
    assert_eq!(outcome, DispatchOutcome::Window(WindowRouting::SlotCallback(0)));
    assert_eq!(entries(&log), vec!["global", "on_buy"]);
}

#[test]
fn test_removal_disallowed_suppresses_by_default() {
    let h = Harness::new();
    let log = log();
    let ctx = h.context("shop");

    let window = h
        .bridge
        .create_window(&ctx, "Shop", 1)
        .unwrap()
        .set_item(0, apple())
        .set_item_with(1, apple(), h.canceller(&log, "let-through", false))
        .build();

    let click = h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left);
    h.host.fire(&click);
    assert!(click.is_cancelled());

    let click = h.click(window.id(), ClickTarget::Window, Some(1), ClickGesture::Left);
    h.host.fire(&click);
    assert!(!click.is_cancelled());
    assert_eq!(entries(&log), vec!["let-through"]);
}

#[test]
fn test_removal_allowed_leaves_click_alone() {
    let h = Harness::new();
    let ctx = h.context("chest");
    let window = h
        .bridge
        .create_window(&ctx, "Chest", 1)
        .unwrap()
        .set_allow_item_removal(true)
        .build();

    let click = h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left);
    h.host.fire(&click);
    assert!(!click.is_cancelled());

    let shift = h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::MoveToOtherInventory);
    assert_eq!(h.bridge.dispatch(&shift), DispatchOutcome::Window(WindowRouting::NoCallback));
    assert!(!shift.is_cancelled());
}

#[test]
fn test_move_to_other_inventory_blocked() {
    let h = Harness::new();
    let log = log();
    let ctx = h.context("shop");
    let window = h
        .bridge
        .create_window(&ctx, "Shop", 1)
        .unwrap()
        .set_item_with(0, apple(), h.recorder(&log, "slot"))
        .on_click(h.recorder(&log, "global"))
        .build();

    let click = h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::MoveToOtherInventory);
    assert_eq!(h.bridge.dispatch(&click), DispatchOutcome::Window(WindowRouting::Blocked));
    assert!(click.is_cancelled());
    assert!(entries(&log).is_empty());
}

#[test]
fn test_viewer_inventory_clicks() {
    let h = Harness::new();
    let log = log();
    let ctx = h.context("shop");
    let window = h
        .bridge
        .create_window(&ctx, "Shop", 1)
        .unwrap()
        .set_item_with(3, apple(), h.recorder(&log, "slot"))
        .on_click(h.recorder(&log, "global"))
        .build();

    // Plain clicks in the viewer's own inventory are not ours
    let plain = h.click(window.id(), ClickTarget::ViewerInventory, Some(3), ClickGesture::Left);
    assert_eq!(h.bridge.dispatch(&plain), DispatchOutcome::Window(WindowRouting::Ignored));

    // Shift-clicks from below go to the global callback, never a slot callback
    let shift = h.click(window.id(), ClickTarget::ViewerInventory, Some(3), ClickGesture::ShiftLeft);
    assert_eq!(
        h.bridge.dispatch(&shift),
        DispatchOutcome::Window(WindowRouting::GlobalCallback)
    );
    assert!(!shift.is_cancelled());

    let outside = h.click(window.id(), ClickTarget::Outside, None, ClickGesture::Left);
    assert_eq!(h.bridge.dispatch(&outside), DispatchOutcome::Window(WindowRouting::Ignored));

    assert_eq!(entries(&log), vec!["global"]);
}

#[test]
fn test_managed_clicks_skip_generic_handlers() {
    let h = Harness::new();
    let log = log();
    let ui = h.context("ui");
    let audit = h.context("audit");

    h.bridge
        .register_event(&audit, "inventory.InventoryClickEvent", h.recorder(&log, "audit"), EventPriority::Monitor)
        .unwrap();
    let window = h
        .bridge
        .create_window(&ui, "Menu", 1)
        .unwrap()
        .on_click(h.recorder(&log, "menu"))
        .build();

    h.host.fire(&h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left));
    assert_eq!(entries(&log), vec!["menu"]);

    // A window nobody manages falls back to generic handlers
    h.host.fire(&h.click(mcjs_events::WindowId(9999), ClickTarget::Window, Some(0), ClickGesture::Left));
    assert_eq!(entries(&log), vec!["menu", "audit"]);
}

#[test]
fn test_close_then_release() {
    let config = BridgeConfig {
        release_delay_ms: 50,
        ..BridgeConfig::default()
    };
    let h = Harness::with_config(true, config);
    let log = log();
    let ctx = h.context("shop");
    let window = h
        .bridge
        .create_window(&ctx, "Shop", 1)
        .unwrap()
        .set_item(0, apple())
        .on_click(h.recorder(&log, "click"))
        .on_close(h.recorder(&log, "closed"))
        .build();

    h.host.fire(&h.close(window.id()));
    assert_eq!(entries(&log), vec!["closed"]);
    assert_eq!(window.state(), SessionState::Closed);

    // Closed: mutations fail, reads still work
    assert!(!window.update_item(1, Some(apple())));
    assert!(!window.add_item(apple()));
    assert!(!window.clear());
    assert!(!h.bridge.refresh_window(window.id()));
    assert_eq!(window.get_item(0), Some(apple()));

    // Clicks after close are ignored
    let click = h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left);
    assert_eq!(h.bridge.dispatch(&click), DispatchOutcome::Window(WindowRouting::Ignored));

    // A second close does not re-run the callback
    h.host.fire(&h.close(window.id()));
    assert_eq!(entries(&log), vec!["closed"]);

    let now = Instant::now();
    assert_eq!(h.bridge.tick(now), 0);
    assert_eq!(h.bridge.tick(now + Duration::from_millis(100)), 1);
    assert_eq!(window.state(), SessionState::Released);
    assert!(h.bridge.window(window.id()).is_none());
    assert_eq!(h.bridge.sessions().session_count(), 0);
}

#[test]
fn test_refresh_restores_latest_layout() {
    let h = Harness::new();
    let ctx = h.context("shop");
    let pane = ItemStack::new("glass_pane", 1);
    let window = h
        .bridge
        .create_window(&ctx, "Shop", 1)
        .unwrap()
        .set_item(0, apple())
        .set_background(pane.clone())
        .build();
    assert_eq!(window.first_empty_slot(), None);

    assert!(window.update_item(4, Some(ItemStack::new("bread", 3))));
    assert!(window.clear());
    assert!(window.is_slot_empty(0));

    assert!(h.bridge.refresh_window(window.id()));
    assert_eq!(window.get_item(0), Some(apple()));
    assert_eq!(window.get_item(4), Some(ItemStack::new("bread", 3)));
    assert_eq!(window.get_item(8), Some(pane));
}

#[test]
fn test_handle_operations() {
    let h = Harness::new();
    let ctx = h.context("storage");
    let window = h
        .bridge
        .create_window(&ctx, "Storage", 1)
        .unwrap()
        .set_items(0, 2, apple())
        .build();

    assert_eq!(window.first_empty_slot(), Some(3));
    assert!(window.add_item(ItemStack::new("bread", 1)));
    assert_eq!(window.get_item(3), Some(ItemStack::new("bread", 1)));
    assert!(window.is_slot_empty(42));
    assert_eq!(window.get_item(42), None);
    assert!(!window.update_item(42, Some(apple())));

    assert!(window.update_item(0, None));
    assert_eq!(window.first_empty_slot(), Some(0));

    assert!(window.set_data("page", "1"));
    assert_eq!(window.get_data("page"), Some("1".to_string()));
    assert_eq!(window.remove_data("page"), Some("1".to_string()));
    assert_eq!(window.get_data("page"), None);
}

#[test]
fn test_click_callback_can_update_window() {
    let h = Harness::new();
    let ctx = h.context("counter");
    let slot: Arc<Mutex<Option<WindowHandle>>> = Arc::new(Mutex::new(None));

    let handle_slot = slot.clone();
    let bump = h.env.register(move |_| {
        if let Some(window) = handle_slot.lock().unwrap().as_ref() {
            window.update_item(0, Some(ItemStack::new("apple", 2)));
        }
        Ok(())
    });
    let window = h
        .bridge
        .create_window(&ctx, "Counter", 1)
        .unwrap()
        .set_item_with(0, apple(), bump)
        .build();
    *slot.lock().unwrap() = Some(window.clone());

    h.host.fire(&h.click(window.id(), ClickTarget::Window, Some(0), ClickGesture::Left));
    assert_eq!(window.get_item(0), Some(ItemStack::new("apple", 2)));
}

#[test]
fn test_unregister_module_releases_windows() {
    let h = Harness::new();
    let log = log();
    let shop = h.context("shop");
    let other = h.context("other");

    let mine = h
        .bridge
        .create_window(&shop, "Shop", 1)
        .unwrap()
        .on_click(h.recorder(&log, "shop"))
        .build();
    let theirs = h.bridge.create_window(&other, "Other", 1).unwrap().build();

    h.bridge.unregister_module(&ModuleId::new("shop"));
    assert_eq!(mine.state(), SessionState::Released);
    assert_eq!(theirs.state(), SessionState::Open);

    let outcome = h.bridge.dispatch(&h.click(mine.id(), ClickTarget::Window, Some(0), ClickGesture::Left));
    assert_eq!(outcome, DispatchOutcome::NoHandlers);
    assert!(entries(&log).is_empty());
}

#[test]
fn test_shutdown_releases_windows() {
    let h = Harness::new();
    let ctx = h.context("shop");
    let window = h.bridge.create_window(&ctx, "Shop", 2).unwrap().build();

    h.bridge.shutdown();
    assert_eq!(window.state(), SessionState::Released);
    assert!(window.open(&steve()).is_err());
}

#[test]
fn test_contains_on_empty_window() {
    let h = Harness::new();
    let ctx = h.context("storage");
    let window = h.bridge.create_window(&ctx, "Storage", 1).unwrap().build();

    assert!(!window.contains(&apple()));
    assert!(!window.contains_at_least(&apple(), 1));
    assert!(!window.remove_item(&apple()));
    assert_eq!(window.first_empty_slot(), Some(0));
}

#[test]
fn test_remove_item_across_stacks() {
    let h = Harness::new();
    let ctx = h.context("storage");
    let window = h
        .bridge
        .create_window(&ctx, "Storage", 1)
        .unwrap()
        .set_item(0, ItemStack::new("apple", 3))
        .set_item(2, ItemStack::new("bread", 1))
        .set_item(4, ItemStack::new("apple", 2))
        .build();

    assert!(window.contains(&ItemStack::new("apple", 3)));
    assert!(!window.contains(&ItemStack::new("apple", 4)));
    assert!(window.contains_at_least(&ItemStack::new("apple", 1), 5));
    assert!(!window.contains_at_least(&ItemStack::new("apple", 1), 6));
    assert!(!window.contains_at_least(&apple(), 0));

    assert!(window.remove_item(&ItemStack::new("apple", 4)));
    assert!(window.is_slot_empty(0));
    assert_eq!(window.get_item(4), Some(ItemStack::new("apple", 1)));

    // Not enough left: takes what there is and reports failure
    assert!(!window.remove_item(&ItemStack::new("apple", 5)));
    assert!(window.is_slot_empty(4));
    assert_eq!(window.get_item(2), Some(ItemStack::new("bread", 1)));

    // Removals are part of the stored layout
    assert!(h.bridge.refresh_window(window.id()));
    assert!(window.is_slot_empty(0));
    assert!(window.is_slot_empty(4));
}

#[test]
fn test_fill_and_fill_range() {
    let h = Harness::new();
    let ctx = h.context("storage");
    let pane = ItemStack::new("glass_pane", 1);
    let window = h.bridge.create_window(&ctx, "Storage", 1).unwrap().build();

    // Range past the last slot is clamped
    assert!(window.fill_range(pane.clone(), 5, 100));
    assert_eq!(window.first_empty_slot(), Some(0));
    assert!(window.is_slot_empty(4));
    assert!((5..9).all(|slot| window.get_item(slot) == Some(pane.clone())));

    assert!(!window.fill_range(pane.clone(), 9, 12));

    // Inclusive end
    assert!(window.fill_range(apple(), 1, 2));
    assert_eq!(window.get_item(2), Some(apple()));
    assert!(window.is_slot_empty(3));

    assert!(window.fill(apple()));
    assert_eq!(window.first_empty_slot(), None);
    assert!(window.contains_at_least(&apple(), 9));
}

#[test]
fn test_inventory_operations_refused_after_close() {
    let h = Harness::new();
    let ctx = h.context("storage");
    let window = h
        .bridge
        .create_window(&ctx, "Storage", 1)
        .unwrap()
        .set_item(0, apple())
        .build();
    assert!(window.set_data("page", "1"));

    h.host.fire(&h.close(window.id()));
    assert_eq!(window.state(), SessionState::Closed);

    assert!(!window.remove_item(&apple()));
    assert!(!window.fill(apple()));
    assert!(!window.fill_range(apple(), 0, 3));
    assert!(window.is_slot_empty(1));

    // Data is frozen before the release tick runs
    assert!(!window.set_data("page", "2"));
    assert_eq!(window.get_data("page"), Some("1".to_string()));
    assert_eq!(h.bridge.sessions().pending_releases(), 1);

    // Reads of rendered content stay valid
    assert!(window.contains(&apple()));
    assert!(window.contains_at_least(&apple(), 1));
}
