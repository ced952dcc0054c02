//! Command-line arguments

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use rr_machine::{MachineConfig, TimingProfile};
use rr_state::{FileStore, KeyValueStore, MemoryStore};

#[derive(Debug, Parser)]
#[command(name = "rr-shell", about = "Reel Raffle: reveal three winners, one lever pull at a time")]
pub struct Cli {
    /// Machine config file (.json, .yaml or .yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the saved raffle state
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep state in memory only (nothing is saved)
    #[arg(long, conflicts_with = "data_dir")]
    pub memory: bool,

    /// Timing profile
    #[arg(short, long, value_enum)]
    pub timing: Option<TimingArg>,

    /// Seed the draw for a reproducible rehearsal
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start on the custom candidate set
    #[arg(long)]
    pub custom: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingArg {
    Normal,
    Turbo,
    Studio,
}

impl From<TimingArg> for TimingProfile {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::Normal => TimingProfile::Normal,
            TimingArg::Turbo => TimingProfile::Turbo,
            TimingArg::Studio => TimingProfile::Studio,
        }
    }
}

impl Cli {
    /// Config file (or defaults) with the command-line overrides applied
    pub fn machine_config(&self) -> Result<MachineConfig> {
        let mut config = match &self.config {
            Some(path) => MachineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => MachineConfig::default(),
        };

        if let Some(timing) = self.timing {
            config.timing_profile = timing.into();
            config.spin_duration_ms = None;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        Ok(config)
    }

    /// Backing store for the raffle state
    pub fn store(&self, config: &MachineConfig) -> Arc<dyn KeyValueStore> {
        if self.memory {
            log::info!("[Shell] In-memory state, nothing will be saved");
            return Arc::new(MemoryStore::new());
        }

        let store = match &config.data_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_default_dir(),
        };
        log::info!("[Shell] State directory: {}", store.dir().display());
        Arc::new(store)
    }
}
