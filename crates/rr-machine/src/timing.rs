//! Timing profiles for the reveal sequence

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Stage timing (3 s spin)
    Normal,
    /// Fast rehearsal
    Turbo,
    /// Near-instant, for tests and dry runs
    Studio,
    /// Scaled or hand-tuned values
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Detailed timing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Time from lever pull to winner reveal (ms)
    pub spin_duration_ms: f64,

    /// Delay between consecutive reels settling (ms)
    pub reel_stagger_ms: f64,

    /// Pause between closing the last celebration and opening the finale (ms)
    pub finale_delay_ms: f64,

    /// Period of the finale fireworks loop (ms)
    pub fireworks_interval_ms: f64,

    /// Candidates shown on each spinning reel
    pub strip_length: usize,
}

impl TimingConfig {
    /// Stage timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            spin_duration_ms: 3000.0,
            reel_stagger_ms: 200.0,
            finale_delay_ms: 500.0,
            fireworks_interval_ms: 800.0,
            strip_length: 10,
        }
    }

    /// Fast rehearsal
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            spin_duration_ms: 1000.0,
            reel_stagger_ms: 80.0,
            finale_delay_ms: 200.0,
            fireworks_interval_ms: 500.0,
            strip_length: 6,
        }
    }

    /// Near-instant
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            spin_duration_ms: 10.0,
            reel_stagger_ms: 0.0,
            finale_delay_ms: 0.0,
            fireworks_interval_ms: 250.0,
            strip_length: 3,
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale all durations by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            spin_duration_ms: self.spin_duration_ms * factor,
            reel_stagger_ms: self.reel_stagger_ms * factor,
            finale_delay_ms: self.finale_delay_ms * factor,
            fireworks_interval_ms: self.fireworks_interval_ms * factor,
            strip_length: self.strip_length,
        }
    }

    pub fn spin_duration(&self) -> Duration {
        millis(self.spin_duration_ms)
    }

    pub fn finale_delay(&self) -> Duration {
        millis(self.finale_delay_ms)
    }

    /// Never zero; a periodic timer needs a positive period
    pub fn fireworks_interval(&self) -> Duration {
        millis(self.fireworks_interval_ms).max(Duration::from_millis(1))
    }

    /// Settle offset of reel `reel_index`
    pub fn reel_delay(&self, reel_index: usize) -> Duration {
        millis(self.reel_stagger_ms * reel_index as f64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

/// Non-positive and NaN values are zero; values past `Duration::MAX` saturate
fn millis(ms: f64) -> Duration {
    if ms > 0.0 {
        Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}
