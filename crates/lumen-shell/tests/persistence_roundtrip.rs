//! End-to-end persistence scenario
//!
//! Seed the durable document, boot the orchestrator with the real built-in
//! modules, delete a note through the input path, exit to the menu, and
//! verify what landed on disk: the Notes entry is emptied, every other key
//! is untouched.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;

use lumen_core::{notification_channel, InputEvent, PersistentStore};
use lumen_hardware::testing::FakeToolRunner;
use lumen_hardware::{HardwareConfig, HardwareEngine};
use lumen_runtime::{Orchestrator, ScreenState};
use lumen_shell::modules::build_registry;

fn boot(state_path: &std::path::Path) -> Orchestrator {
    let (notifier, receiver) = notification_channel();
    let runner = Arc::new(FakeToolRunner::new());
    let engine = HardwareEngine::new(HardwareConfig::default(), runner.clone());
    let registry = build_registry(&notifier, &engine, runner);
    let store = PersistentStore::open(state_path);

    Orchestrator::new(
        registry,
        store,
        &lumen_core::KioskConfig::default(),
        notifier,
        receiver,
        Instant::now(),
    )
}

#[tokio::test]
async fn test_deleting_a_note_persists_and_leaves_other_keys_alone() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    std::fs::write(
        &state_path,
        serde_json::to_string(&json!({
            "Notes": {"notes": [{"title": "Buy milk", "body": "two liters", "created": "2026-08-01 09:00"}]},
            "Timer": {"hours": 0, "minutes": 15, "seconds": 0},
            "Someday Module": {"unknown": true}
        }))
        .unwrap(),
    )
    .unwrap();

    let mut orchestrator = boot(&state_path);
    let now = Instant::now();

    // Notes is the first menu entry: enter, delete the note, go back.
    orchestrator.dispatch_input(&InputEvent::Confirm, now);
    assert!(matches!(orchestrator.screen(), ScreenState::ActiveModule(_)));
    orchestrator.dispatch_input(&InputEvent::Char('d'), now);
    orchestrator.dispatch_input(&InputEvent::Back, now);
    assert_eq!(orchestrator.screen(), ScreenState::MainMenu);

    // Re-read the document from disk.
    let reloaded = PersistentStore::open(&state_path);
    let notes = reloaded.get("Notes").unwrap();
    assert_eq!(notes["notes"].as_array().unwrap().len(), 0);

    let timer = reloaded.get("Timer").unwrap();
    assert_eq!(timer["minutes"], 15);

    let unknown = reloaded.get("Someday Module").unwrap();
    assert_eq!(unknown["unknown"], true);

    assert!(reloaded.blob().last_saved.is_some());
}

#[tokio::test]
async fn test_full_shutdown_sweep_writes_every_module_key() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("state.json");

    let mut orchestrator = boot(&state_path);
    orchestrator.shutdown();

    let reloaded = PersistentStore::open(&state_path);
    for key in ["Notes", "Calendar", "World Clock", "Timer", "Settings"] {
        assert!(reloaded.get(key).is_some(), "missing key {}", key);
    }
}
