//! Integration tests for the hotkey pipeline.
//!
//! `MockInputSource` → `HandleHotkeysUseCase` → `Dispatcher` → fake desk.
//! The use case runs on its own thread, exactly as in the binary.

mod common;

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use desk_core::{Bindings, DeviceAddress, Key, ReconnectPolicy};
use tokio::runtime::Handle;

use desk_hotkeys::application::handle_hotkeys::HandleHotkeysUseCase;
use desk_hotkeys::application::resolve_address::{AddressResolver, CurrentAddress, ResolverConfig};
use desk_hotkeys::application::send_command::{CommandSender, Dispatcher, DEFAULT_REQUEST_TIMEOUT};
use desk_hotkeys::infrastructure::input_capture::{mock::MockInputSource, InputSource, RawKeyEvent};
use desk_hotkeys::infrastructure::storage::config::AppConfig;

use common::{Behavior, CountingTable, FakeDesk, FixedNames};

/// Runs `script` against a fresh pipeline, waits for `expected` requests and
/// returns the command URLs the desk received, sorted (dispatch tasks may
/// complete in any order).
async fn run_pipeline(
    bindings: Bindings,
    expected: usize,
    script: impl FnOnce(&MockInputSource),
) -> Vec<String> {
    let desk = Arc::new(FakeDesk::new(Behavior::Ok, Behavior::Ok));
    let current = Arc::new(CurrentAddress::new());
    current.publish(DeviceAddress::from(Ipv4Addr::new(192, 168, 1, 42)));
    let running = Arc::new(AtomicBool::new(true));
    let resolver = Arc::new(AddressResolver::new(
        ResolverConfig::default(),
        desk.clone(),
        Arc::new(FixedNames(Ipv4Addr::new(192, 168, 1, 42))),
        Arc::new(CountingTable::unavailable()),
        current.clone(),
    ));
    let dispatcher = Dispatcher::new(
        CommandSender::new(desk.clone(), current, DEFAULT_REQUEST_TIMEOUT),
        ReconnectPolicy::default(),
        resolver,
        Arc::clone(&running),
        Handle::current(),
    );

    let source = MockInputSource::new();
    let events = source.start().unwrap();
    let loop_running = Arc::clone(&running);
    let worker = std::thread::spawn(move || {
        HandleHotkeysUseCase::new(bindings, dispatcher).run(&events, &loop_running);
    });

    script(&source);
    source.stop();
    worker.join().unwrap();

    for _ in 0..200 {
        if desk.command_urls().len() >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    // Catch stray extra requests.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut urls = desk.command_urls();
    urls.sort();
    running.store(false, Ordering::Relaxed);
    urls
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_alt_page_up_hold_sends_up_then_stop() {
    // Act – Alt held, PgUp auto-repeats three times, then both released
    let urls = run_pipeline(Bindings::default(), 2, |source| {
        source.inject_event(RawKeyEvent::KeyDown { key: Key::AltLeft });
        for _ in 0..3 {
            source.inject_event(RawKeyEvent::KeyDown { key: Key::PageUp });
        }
        source.inject_event(RawKeyEvent::KeyUp { key: Key::PageUp });
        source.inject_event(RawKeyEvent::KeyUp { key: Key::AltLeft });
    })
    .await;

    // Assert – exactly one start and one stop
    assert_eq!(urls, vec!["http://192.168.1.42/stop", "http://192.168.1.42/up"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_super_page_up_sends_standing_only() {
    let urls = run_pipeline(Bindings::default(), 1, |source| {
        source.tap_chord(&[Key::MetaLeft, Key::PageUp]);
    })
    .await;

    assert_eq!(urls, vec!["http://192.168.1.42/standing"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configured_hold_binding_replaces_default_holds() {
    // Arrange
    let cfg: AppConfig = toml::from_str(
        r#"
        [[bindings.hold]]
        name = "nudge-up"
        modifiers = ["ControlLeft", "ControlRight"]
        trigger = "ArrowUp"
        start = "up"
        stop = "stop"
        "#,
    )
    .unwrap();
    cfg.validate().unwrap();

    // Act
    let urls = run_pipeline(cfg.bindings, 3, |source| {
        source.tap_chord(&[Key::ControlRight, Key::ArrowUp]);
        source.tap_chord(&[Key::AltLeft, Key::PageUp]);
        source.tap_chord(&[Key::MetaRight, Key::PageDown]);
    })
    .await;

    // Assert – Alt+PgUp is gone, the one-shot presets are kept
    assert_eq!(
        urls,
        vec![
            "http://192.168.1.42/seating",
            "http://192.168.1.42/stop",
            "http://192.168.1.42/up",
        ]
    );
}
