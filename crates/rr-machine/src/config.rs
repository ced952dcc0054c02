//! Machine configuration
//!
//! Loaded from JSON or YAML (by file extension). Every field has a default,
//! so a config file only needs the values it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use rr_core::{RaffleError, RaffleResult, RosterConfig};
use rr_state::STORAGE_KEY;

use crate::timing::{TimingConfig, TimingProfile};

/// Machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Timing profile
    pub timing_profile: TimingProfile,
    /// Spin duration override (ms)
    pub spin_duration_ms: Option<f64>,
    /// Key of the persisted state record
    pub storage_key: String,
    /// Directory of the file store (platform data dir when unset)
    pub data_dir: Option<PathBuf>,
    /// Fixed RNG seed for reproducible draws
    pub seed: Option<u64>,
    /// Default and custom candidate sets
    pub roster: RosterConfig,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            timing_profile: TimingProfile::Normal,
            spin_duration_ms: None,
            storage_key: STORAGE_KEY.to_string(),
            data_dir: None,
            seed: None,
            roster: RosterConfig::default(),
        }
    }
}

impl MachineConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> RaffleResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| RaffleError::Config(format!("{}: {}", path.display(), e)))?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };
        log::info!("[Machine] Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> RaffleResult<Self> {
        serde_json::from_str(json).map_err(|e| RaffleError::Config(format!("Invalid config: {}", e)))
    }

    pub fn from_yaml(yaml: &str) -> RaffleResult<Self> {
        serde_yml::from_str(yaml).map_err(|e| RaffleError::Config(format!("Invalid config: {}", e)))
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Effective timing
    pub fn timing(&self) -> TimingConfig {
        let mut timing = TimingConfig::from_profile(self.timing_profile);
        if let Some(ms) = self.spin_duration_ms {
            timing.spin_duration_ms = ms.max(0.0);
            timing.profile = TimingProfile::Custom;
        }
        timing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = MachineConfig::default();
        assert_eq!(config.storage_key, "slot_machine_state_v3");
        assert_eq!(config.timing().spin_duration(), Duration::from_millis(3000));
    }

    #[test]
    fn test_partial_json() {
        let config = MachineConfig::from_json(r#"{"timing_profile": "Turbo", "seed": 7}"#).unwrap();
        assert_eq!(config.timing_profile, TimingProfile::Turbo);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.roster, RosterConfig::default());
    }

    #[test]
    fn test_yaml_with_roster_and_override() {
        let yaml = r#"
spin_duration_ms: 1500
roster:
  default_set_size: 5
  custom_names: [Ada, Grace]
"#;
        let config = MachineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.timing().spin_duration(), Duration::from_millis(1500));
        assert_eq!(config.timing().profile, TimingProfile::Custom);
        assert_eq!(config.roster.default_candidates().len(), 5);
        assert_eq!(config.roster.custom_candidates()[1].name, "Grace");
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            MachineConfig::from_json("{\"seed\": \"abc\"}"),
            Err(RaffleError::Config(_))
        ));
        assert!(MachineConfig::load("/definitely/missing/raffle.yaml").is_err());
    }
}
