//! File-backed persistence tests
//!
//! Persister writes through a `FileStore`, a fresh load reads it back.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use rr_core::{Candidate, MachineEvent, MachineObserver, MachineSnapshot, RosterConfig, WinnersConfig};
use rr_state::{FileStore, KeyValueStore, STORAGE_KEY, StatePersister, load_record};

fn snapshot() -> MachineSnapshot {
    MachineSnapshot {
        candidates: vec![
            Candidate::new("custom-0", "Ada", "/participants/Ada.png"),
            Candidate::new("custom-1", "Grace", "/participants/Grace.png"),
        ],
        winners_config: WinnersConfig::from_slots([None, None, Some("custom-1".into())]),
        revealed_count: 2,
        use_custom_images: true,
        ..MachineSnapshot::default()
    }
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let persister = StatePersister::new(store.clone(), STORAGE_KEY);

    persister.on_event(&MachineEvent::WinnersConfigUpdated, &snapshot());
    assert!(dir.path().join("slot_machine_state_v3.json").exists());

    let record = load_record(store.as_ref(), STORAGE_KEY, &RosterConfig::default());
    assert_eq!(record.candidates, snapshot().candidates);
    assert_eq!(record.winners_config, snapshot().winners_config);
    assert_eq!(record.revealed_count, 2);
    assert!(record.use_custom_images);
}

#[test]
fn test_missing_file_loads_defaults() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("never-created"));

    let record = load_record(&store, STORAGE_KEY, &RosterConfig::default());
    assert_eq!(record.candidates.len(), 30);
    assert_eq!(record.revealed_count, 0);
    assert!(!record.use_custom_images);
}

#[test]
fn test_hand_edited_file_is_tolerated() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    fs::write(
        dir.path().join("slot_machine_state_v3.json"),
        r#"{
            "candidates": [{"id": 1, "name": "One", "image": "1.png"}],
            "winnersConfig": [1, {"bad": true}],
            "revealedCount": 9,
            "useCustomImages": "yes",
            "extra": "ignored"
        }"#,
    )
    .unwrap();

    let record = load_record(&store, STORAGE_KEY, &RosterConfig::default());
    assert_eq!(record.candidates[0].id.as_str(), "1");
    assert_eq!(record.winners_config.slots(), &[Some("1".into()), None, None]);
    assert_eq!(record.revealed_count, 0);
    assert!(!record.use_custom_images);
}

#[test]
fn test_latest_save_wins() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let persister = StatePersister::new(store.clone(), STORAGE_KEY);

    let mut state = snapshot();
    persister.on_event(&MachineEvent::GameReset, &state);
    state.revealed_count = 0;
    state.winners_config = WinnersConfig::new();
    persister.on_event(&MachineEvent::GameReset, &state);

    let record = load_record(store.as_ref(), STORAGE_KEY, &RosterConfig::default());
    assert_eq!(record.revealed_count, 0);
    assert_eq!(record.winners_config.assigned_count(), 0);
    assert_eq!(persister.tracker().saves(), 2);
}
