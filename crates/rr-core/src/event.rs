//! Machine events and change notification
//!
//! The presentation layer and the persistence collaborator never poll the
//! machine: they receive a `MachineEvent` together with a `MachineSnapshot`
//! taken right after the mutation completed.

use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::winners::{Place, ROUND_COUNT, WinnersConfig};

/// How a spin picked its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Pre-assigned through the winners config
    Rigged,
    /// Uniform draw among candidates not assigned to any slot
    Drawn,
    /// Nothing left to draw from; first candidate of the active set
    Fallback,
}

/// A completed state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MachineEvent {
    /// Spin accepted; the winner is published on completion
    SpinStarted { round: usize, place: Place },
    /// Spin finished and progress advanced
    SpinCompleted {
        round: usize,
        place: Place,
        winner: Candidate,
        resolution: Resolution,
    },
    /// Progress cleared
    GameReset,
    /// Winner slots replaced
    WinnersConfigUpdated,
    /// Active candidate set replaced
    CandidatesUpdated { count: usize },
    /// Data source switched
    DataSourceChanged { use_custom_images: bool },
}

impl MachineEvent {
    /// Event name (for logging)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SpinStarted { .. } => "SPIN_STARTED",
            Self::SpinCompleted { .. } => "SPIN_COMPLETED",
            Self::GameReset => "GAME_RESET",
            Self::WinnersConfigUpdated => "WINNERS_CONFIG_UPDATED",
            Self::CandidatesUpdated { .. } => "CANDIDATES_UPDATED",
            Self::DataSourceChanged { .. } => "DATA_SOURCE_CHANGED",
        }
    }
}

/// Read-only copy of the machine state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub candidates: Vec<Candidate>,
    pub winners_config: WinnersConfig,
    pub revealed_count: usize,
    pub is_spinning: bool,
    pub current_winner: Option<Candidate>,
    pub use_custom_images: bool,
    /// Winner revealed in each round of the current session
    pub revealed: [Option<Candidate>; ROUND_COUNT],
    /// Change counter, bumped by every completed state change.
    /// A snapshot with a higher revision is newer.
    pub revision: u64,
}

impl MachineSnapshot {
    /// All three rounds revealed
    pub fn is_complete(&self) -> bool {
        self.revealed_count >= ROUND_COUNT
    }

    /// Place the next spin will reveal
    pub fn next_place(&self) -> Option<Place> {
        Place::from_round(self.revealed_count)
    }

    /// Winner to show on the podium for a place: the revealed winner, else
    /// the configured winner if it is in the active set.
    pub fn podium_winner(&self, place: Place) -> Option<&Candidate> {
        self.revealed[place.slot()]
            .as_ref()
            .or_else(|| self.winners_config.resolve(place.slot(), &self.candidates))
    }
}

/// Receives every completed state change
pub trait MachineObserver: Send + Sync {
    fn on_event(&self, event: &MachineEvent, snapshot: &MachineSnapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_podium_prefers_revealed() {
        let a = Candidate::new("a", "A", "");
        let b = Candidate::new("b", "B", "");
        let mut snapshot = MachineSnapshot {
            candidates: vec![a.clone(), b.clone()],
            winners_config: WinnersConfig::from_slots([Some("a".into()), Some("gone".into()), None]),
            ..MachineSnapshot::default()
        };

        assert_eq!(snapshot.podium_winner(Place::Third), Some(&a));
        assert_eq!(snapshot.podium_winner(Place::Second), None);

        snapshot.revealed[0] = Some(b.clone());
        assert_eq!(snapshot.podium_winner(Place::Third), Some(&b));
    }

    #[test]
    fn test_next_place() {
        let mut snapshot = MachineSnapshot::default();
        assert_eq!(snapshot.next_place(), Some(Place::Third));
        snapshot.revealed_count = 3;
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.next_place(), None);
    }
}
