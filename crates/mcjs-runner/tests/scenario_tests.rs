use std::time::{Duration, Instant};

use mcjs_bridge::{BridgeConfig, DispatchOutcome, SessionState};
use mcjs_events::ViewerId;
use mcjs_runner::demo::{BROKEN, GREETER, SHOP_OFFER_SLOT};
use mcjs_runner::{DemoModules, LocalEventBus};

fn demo(dynamic: bool) -> DemoModules {
    let demo = DemoModules::new(LocalEventBus::standard(dynamic), BridgeConfig::default()).unwrap();
    demo.load().unwrap();
    demo
}

#[test]
fn test_scenario_transcript() {
    let demo = demo(true);
    let report = demo.run_scenario().unwrap();

    assert_eq!(
        report.transcript,
        vec![
            "Welcome, steve!",
            "miner: stone (suppressed: false)",
            "guard: bedrock is protected",
            "miner: bedrock (suppressed: true)",
            "shop: steve bought a diamond",
            "shop: nothing for sale there (window-1)",
            "shop: come again",
            "Goodbye, steve",
        ]
    );
    assert_eq!(
        report.block_breaks,
        vec![("stone".to_string(), false), ("bedrock".to_string(), true)]
    );
}

#[test]
fn test_legacy_host_uses_listener_chains() {
    let with_dynamic = demo(true);
    let legacy = demo(false);

    let a = with_dynamic.run_scenario().unwrap();
    let b = legacy.run_scenario().unwrap();
    assert_eq!(a.transcript, b.transcript);

    // Join, quit, break, exp, click, close
    assert_eq!(legacy.bus().install_count(), 6);
    assert_eq!(legacy.bridge().bridged_count(), 6);
}

#[test]
fn test_shop_window_rendered_and_released() {
    let demo = demo(true);
    let report = demo.run_scenario().unwrap();
    let bus = demo.bus();

    let rendered = bus.rendered(report.shop);
    assert_eq!(rendered.len(), 27);
    assert_eq!(rendered[SHOP_OFFER_SLOT].as_ref().map(|i| i.material.as_str()), Some("diamond"));
    assert!(rendered[0].is_some());
    assert!(rendered[SHOP_OFFER_SLOT - 1].is_none());
    assert_eq!(bus.window_title(report.shop).as_deref(), Some("Shop"));
    assert!(bus.viewers(report.shop).is_empty());

    let shop = demo.bridge().window(report.shop).unwrap();
    assert_eq!(shop.state(), SessionState::Closed);

    let later = Instant::now() + Duration::from_secs(1);
    assert_eq!(demo.bridge().tick(later), 1);
    assert_eq!(shop.state(), SessionState::Released);
    assert!(demo.bridge().window(report.shop).is_none());
}

#[test]
fn test_unload_module() {
    let demo = demo(true);
    assert_eq!(demo.unload(GREETER), 2);
    assert_eq!(demo.unload(GREETER), 0);

    // Only the failing handler is left on quit
    let outcome = demo
        .dispatch_named("org.bukkit.event.player.PlayerQuitEvent", &[("player", "alex")])
        .unwrap();
    match outcome {
        DispatchOutcome::Delivered(report) => {
            assert_eq!(report.invoked, 1);
            assert_eq!(report.failed, 1);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    demo.unload(BROKEN);
    let outcome = demo
        .dispatch_named("org.bukkit.event.player.PlayerQuitEvent", &[])
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::NoHandlers);
}

#[test]
fn test_disabled_module_fails_load() {
    let config = BridgeConfig {
        disabled_modules: vec!["guard".to_string()],
        ..BridgeConfig::default()
    };
    let demo = DemoModules::new(LocalEventBus::standard(true), config).unwrap();
    assert!(demo.load().is_err());
}

#[test]
fn test_shop_open_fails_after_shutdown() {
    let demo = demo(true);
    demo.bridge().shutdown();
    assert!(demo.open_shop(&ViewerId::new("steve")).is_err());
}
