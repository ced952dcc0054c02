//! Persisted state record
//!
//! ```text
//! {
//!   "candidates":      [{ "id": string, "name": string, "image": string }],
//!   "winnersConfig":   [string|null, string|null, string|null],
//!   "revealedCount":   0|1|2|3,
//!   "useCustomImages": boolean
//! }
//! ```
//!
//! Loading is tolerant per field: unknown fields are ignored and each
//! missing or invalid field is replaced by its default. Saving always writes
//! the full record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rr_core::{
    Candidate, CandidateId, MachineSnapshot, ROUND_COUNT, RosterConfig, WinnersConfig,
    validate_candidates,
};

use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

/// Storage key. The version suffix is bumped on schema changes; records
/// under older keys are simply never read again.
pub const STORAGE_KEY: &str = "slot_machine_state_v3";

/// The durable part of the machine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub candidates: Vec<Candidate>,
    pub winners_config: WinnersConfig,
    pub revealed_count: usize,
    pub use_custom_images: bool,
}

impl StateRecord {
    /// Fresh state: generated default set, no assignments, no progress
    pub fn defaults(roster: &RosterConfig) -> Self {
        Self {
            candidates: roster.default_candidates(),
            winners_config: WinnersConfig::new(),
            revealed_count: 0,
            use_custom_images: false,
        }
    }

    pub fn from_snapshot(snapshot: &MachineSnapshot) -> Self {
        Self {
            candidates: snapshot.candidates.clone(),
            winners_config: snapshot.winners_config.clone(),
            revealed_count: snapshot.revealed_count,
            use_custom_images: snapshot.use_custom_images,
        }
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a stored record, defaulting each bad field.
    ///
    /// Fails only when the text is not a JSON object at all.
    pub fn parse(json: &str, roster: &RosterConfig) -> StoreResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(fields) = value else {
            return Err(StoreError::InvalidRecord("not a JSON object".into()));
        };

        let candidates = fields
            .get("candidates")
            .and_then(|v| serde_json::from_value::<Vec<Candidate>>(v.clone()).ok())
            .filter(|list| match validate_candidates(list) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("[State] Stored candidates rejected: {}", e);
                    false
                }
            });

        let winners_config = fields
            .get("winnersConfig")
            .and_then(Value::as_array)
            .map(|slots| WinnersConfig::from_partial(slots.iter().map(slot_id)))
            .unwrap_or_default();

        let revealed_count = fields
            .get("revealedCount")
            .and_then(Value::as_u64)
            .filter(|&n| n <= ROUND_COUNT as u64)
            .map(|n| n as usize)
            .unwrap_or(0);

        let use_custom_images = fields
            .get("useCustomImages")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(match candidates {
            Some(candidates) => Self {
                candidates,
                winners_config,
                revealed_count,
                use_custom_images,
            },
            // No usable candidate list: the generated set is active, so the
            // data source flag must say so too.
            None => Self {
                candidates: roster.default_candidates(),
                winners_config,
                revealed_count,
                use_custom_images: false,
            },
        })
    }
}

fn slot_id(value: &Value) -> Option<CandidateId> {
    match value {
        Value::String(s) => Some(CandidateId::new(s.clone())),
        Value::Number(_) => CandidateId::deserialize(value).ok(),
        _ => None,
    }
}

/// Load the record under `key`, never failing.
///
/// Missing, unreadable or malformed storage yields the default record; the
/// failure is logged and swallowed.
pub fn load_record(store: &dyn KeyValueStore, key: &str, roster: &RosterConfig) -> StateRecord {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            log::info!("[State] No saved state under '{}', starting fresh", key);
            return StateRecord::defaults(roster);
        }
        Err(e) => {
            log::error!("[State] Failed to read saved state: {}", e);
            return StateRecord::defaults(roster);
        }
    };

    match StateRecord::parse(&raw, roster) {
        Ok(record) => {
            log::info!(
                "[State] Restored {} candidates, {} assigned slots, {} revealed",
                record.candidates.len(),
                record.winners_config.assigned_count(),
                record.revealed_count
            );
            record
        }
        Err(e) => {
            log::error!("[State] Failed to load state: {}", e);
            StateRecord::defaults(roster)
        }
    }
}

/// Write the full record under `key`
pub fn save_record(store: &dyn KeyValueStore, key: &str, record: &StateRecord) -> StoreResult<()> {
    store.set(key, &record.to_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn roster() -> RosterConfig {
        RosterConfig::default()
    }

    #[test]
    fn test_record_shape() {
        let record = StateRecord {
            candidates: vec![Candidate::new("a", "A", "a.png")],
            winners_config: WinnersConfig::from_slots([None, Some("a".into()), None]),
            revealed_count: 2,
            use_custom_images: true,
        };
        let value: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();

        assert_eq!(value["candidates"][0]["id"], "a");
        assert_eq!(value["winnersConfig"], serde_json::json!([null, "a", null]));
        assert_eq!(value["revealedCount"], 2);
        assert_eq!(value["useCustomImages"], true);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let record = StateRecord {
            candidates: roster().custom_candidates(),
            winners_config: WinnersConfig::from_slots([
                Some("custom-4".into()),
                None,
                Some("custom-0".into()),
            ]),
            revealed_count: 1,
            use_custom_images: true,
        };

        save_record(&store, STORAGE_KEY, &record).unwrap();
        assert_eq!(load_record(&store, STORAGE_KEY, &roster()), record);
    }

    #[test]
    fn test_missing_and_corrupt_storage() {
        let store = MemoryStore::new();
        assert_eq!(load_record(&store, STORAGE_KEY, &roster()), StateRecord::defaults(&roster()));

        for corrupt in ["{not json", "[1,2,3]", "\"text\"", "null"] {
            store.set(STORAGE_KEY, corrupt).unwrap();
            assert_eq!(
                load_record(&store, STORAGE_KEY, &roster()),
                StateRecord::defaults(&roster()),
                "input {:?}",
                corrupt
            );
        }
    }

    #[test]
    fn test_invalid_fields_default_individually() {
        let json = r#"{
            "candidates": [{"id": 1, "name": "Person 1", "image": "p1"},
                           {"id": 2, "name": "Person 2", "image": "p2"}],
            "winnersConfig": [2, {"bad": true}],
            "revealedCount": 9,
            "useCustomImages": "yes",
            "theme": "dark"
        }"#;
        let record = StateRecord::parse(json, &roster()).unwrap();

        assert_eq!(record.candidates.len(), 2);
        assert_eq!(record.candidates[1].id.as_str(), "2");
        assert_eq!(record.winners_config.slots(), &[Some("2".into()), None, None]);
        assert_eq!(record.revealed_count, 0);
        assert!(!record.use_custom_images);
    }

    #[test]
    fn test_float_ids_match_integer_ids() {
        let json = r#"{
            "candidates": [{"id": 1.0, "name": "Person 1", "image": "p1"},
                           {"id": 2, "name": "Person 2", "image": "p2"}],
            "winnersConfig": [1.0, 2.5, 2]
        }"#;
        let record = StateRecord::parse(json, &roster()).unwrap();

        assert_eq!(record.candidates[0].id.as_str(), "1");
        assert_eq!(record.winners_config.slots(), &[Some("1".into()), None, Some("2".into())]);
    }

    #[test]
    fn test_unusable_candidates_fall_back_to_default_set() {
        let cases = [
            r#"{"candidates": "nope", "useCustomImages": true, "revealedCount": 2}"#,
            r#"{"candidates": [], "useCustomImages": true, "revealedCount": 2}"#,
            r#"{"candidates": [{"id":"x","name":"X","image":""},{"id":"x","name":"Y","image":""}],
                "useCustomImages": true, "revealedCount": 2}"#,
        ];
        for json in cases {
            let record = StateRecord::parse(json, &roster()).unwrap();
            assert_eq!(record.candidates, roster().default_candidates());
            assert!(!record.use_custom_images);
            assert_eq!(record.revealed_count, 2);
        }
    }
}
