//! Save-on-change persistence
//!
//! `StatePersister` is registered as a machine observer: every completed
//! operation hands it a fresh snapshot, and it writes the full record.
//! Writes are serialized; a snapshot older than the last one written is
//! dropped, so the stored record always follows the newest state.
//! Write failures are logged and counted, never returned to the machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use rr_core::{MachineEvent, MachineObserver, MachineSnapshot};

use crate::record::{StateRecord, save_record};
use crate::store::KeyValueStore;

// ============ Save Tracker ============

/// Counters for change / save bookkeeping
#[derive(Debug, Default)]
pub struct SaveTracker {
    /// Changes observed
    change_count: AtomicU64,
    /// Change count covered by the last successful save
    saved_change_count: AtomicU64,
    /// Successful writes
    saves: AtomicU64,
    /// Failed writes
    failures: AtomicU64,
    /// Snapshots dropped because a newer one was already written
    stale: AtomicU64,
}

impl SaveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark that a change occurred
    pub fn mark_changed(&self) {
        self.change_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn complete_save(&self) {
        self.saved_change_count
            .store(self.change_count.load(Ordering::Relaxed), Ordering::Relaxed);
        self.saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fail_save(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skip_stale(&self) {
        self.stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn saves(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn stale(&self) -> u64 {
        self.stale.load(Ordering::Relaxed)
    }

    /// Changes not yet covered by a successful save
    pub fn pending_changes(&self) -> u64 {
        let current = self.change_count.load(Ordering::Relaxed);
        let saved = self.saved_change_count.load(Ordering::Relaxed);
        current.saturating_sub(saved)
    }
}

// ============ State Persister ============

/// Writes the state record after every machine event
pub struct StatePersister {
    store: Arc<dyn KeyValueStore>,
    key: String,
    tracker: SaveTracker,
    /// Revision of the last record written; held for the whole write
    written_revision: Mutex<Option<u64>>,
}

impl StatePersister {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            tracker: SaveTracker::new(),
            written_revision: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tracker(&self) -> &SaveTracker {
        &self.tracker
    }

    /// Write a snapshot now, waiting for any write in progress
    pub fn persist(&self, snapshot: &MachineSnapshot) {
        if snapshot.candidates.is_empty() {
            log::debug!("[State] Skipping save of empty candidate set");
            return;
        }

        let mut written = self.written_revision.lock();
        let last = *written;
        if last.is_some_and(|last| snapshot.revision < last) {
            log::debug!(
                "[State] Dropping revision {} (revision {:?} already saved)",
                snapshot.revision,
                last
            );
            self.tracker.skip_stale();
            return;
        }

        let record = StateRecord::from_snapshot(snapshot);
        match save_record(self.store.as_ref(), &self.key, &record) {
            Ok(()) => {
                *written = Some(snapshot.revision);
                self.tracker.complete_save();
            }
            Err(e) => {
                log::warn!("[State] Failed to save state under '{}': {}", self.key, e);
                self.tracker.fail_save();
            }
        }
    }
}

impl MachineObserver for StatePersister {
    fn on_event(&self, event: &MachineEvent, snapshot: &MachineSnapshot) {
        self.tracker.mark_changed();
        log::trace!("[State] Persisting after {}", event.type_name());
        self.persist(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::record::STORAGE_KEY;
    use crate::store::MemoryStore;
    use rr_core::{Candidate, WinnersConfig};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> StoreResult<Option<String>> {
            Ok(None)
        }
        fn set(&self, key: &str, _value: &str) -> StoreResult<()> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
        fn remove(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }
    }

    fn snapshot() -> MachineSnapshot {
        MachineSnapshot {
            candidates: vec![Candidate::new("a", "A", ""), Candidate::new("b", "B", "")],
            winners_config: WinnersConfig::from_slots([Some("b".into()), None, None]),
            revealed_count: 1,
            ..MachineSnapshot::default()
        }
    }

    #[test]
    fn test_persists_on_event() {
        let store = Arc::new(MemoryStore::new());
        let persister = StatePersister::new(store.clone(), STORAGE_KEY);

        persister.on_event(&MachineEvent::GameReset, &snapshot());

        let saved = store.get(STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("\"revealedCount\":1"));
        assert_eq!(persister.tracker().saves(), 1);
        assert_eq!(persister.tracker().pending_changes(), 0);
    }

    #[test]
    fn test_failed_save_is_swallowed() {
        let persister = StatePersister::new(Arc::new(BrokenStore), STORAGE_KEY);

        persister.on_event(&MachineEvent::WinnersConfigUpdated, &snapshot());
        persister.on_event(&MachineEvent::WinnersConfigUpdated, &snapshot());

        assert_eq!(persister.tracker().saves(), 0);
        assert_eq!(persister.tracker().failures(), 2);
        assert_eq!(persister.tracker().pending_changes(), 2);
    }

    #[test]
    fn test_older_snapshot_never_overwrites_newer() {
        let store = Arc::new(MemoryStore::new());
        let persister = StatePersister::new(store.clone(), STORAGE_KEY);

        let newer = MachineSnapshot {
            revision: 7,
            revealed_count: 0,
            ..snapshot()
        };
        let older = MachineSnapshot {
            revision: 6,
            ..snapshot()
        };
        persister.on_event(&MachineEvent::GameReset, &newer);
        persister.on_event(&MachineEvent::WinnersConfigUpdated, &older);

        let saved = store.get(STORAGE_KEY).unwrap().unwrap();
        assert!(saved.contains("\"revealedCount\":0"));
        assert_eq!(persister.tracker().saves(), 1);
        assert_eq!(persister.tracker().stale(), 1);
    }

    #[test]
    fn test_empty_set_not_saved() {
        let store = Arc::new(MemoryStore::new());
        let persister = StatePersister::new(store.clone(), STORAGE_KEY);

        persister.on_event(&MachineEvent::GameReset, &MachineSnapshot::default());
        assert!(store.is_empty());
    }
}
