//! Winner slots: the optional pre-assigned winner per round

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateId, find_candidate};
use crate::error::RaffleError;

/// Number of reveal rounds (and winner slots)
pub const ROUND_COUNT: usize = 3;

/// Podium place revealed by a round
///
/// Rounds run from the lowest place up: round 0 reveals third place,
/// round 2 reveals first place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Place {
    Third,
    Second,
    First,
}

impl Place {
    /// All places in reveal order
    pub const REVEAL_ORDER: [Place; ROUND_COUNT] = [Place::Third, Place::Second, Place::First];

    /// Place revealed by round `round` (0-based)
    pub fn from_round(round: usize) -> Option<Self> {
        Self::REVEAL_ORDER.get(round).copied()
    }

    /// Slot / round index of this place
    pub fn slot(self) -> usize {
        match self {
            Self::Third => 0,
            Self::Second => 1,
            Self::First => 2,
        }
    }

    /// Short label
    pub fn label(self) -> &'static str {
        match self {
            Self::Third => "3rd place",
            Self::Second => "2nd place",
            Self::First => "1st place",
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Place {
    type Err = RaffleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3" | "3rd" | "third" => Ok(Self::Third),
            "2" | "2nd" | "second" => Ok(Self::Second),
            "1" | "1st" | "first" => Ok(Self::First),
            other => Err(RaffleError::InvalidPlace(other.to_string())),
        }
    }
}

/// Winner assignment for the three rounds
///
/// Slot 0 = 3rd place, slot 1 = 2nd place, slot 2 = 1st place.
/// Serialized as a 3-element array of `string | null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WinnersConfig([Option<CandidateId>; ROUND_COUNT]);

impl WinnersConfig {
    /// All slots unassigned
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slots(slots: [Option<CandidateId>; ROUND_COUNT]) -> Self {
        Self(slots)
    }

    /// Build from an arbitrary-length list: extra entries are dropped,
    /// missing entries are unassigned.
    pub fn from_partial(slots: impl IntoIterator<Item = Option<CandidateId>>) -> Self {
        let mut config = Self::new();
        for (slot, id) in config.0.iter_mut().zip(slots) {
            *slot = id;
        }
        config
    }

    pub fn slots(&self) -> &[Option<CandidateId>; ROUND_COUNT] {
        &self.0
    }

    /// Assigned id for a round, if any
    pub fn get(&self, round: usize) -> Option<&CandidateId> {
        self.0.get(round).and_then(|slot| slot.as_ref())
    }

    pub fn for_place(&self, place: Place) -> Option<&CandidateId> {
        self.get(place.slot())
    }

    /// Is this id assigned to any slot?
    pub fn contains(&self, id: &CandidateId) -> bool {
        self.0.iter().flatten().any(|assigned| assigned == id)
    }

    /// Slot currently holding this id
    pub fn slot_of(&self, id: &CandidateId) -> Option<usize> {
        self.0.iter().position(|slot| slot.as_ref() == Some(id))
    }

    /// Assign a candidate to a place, removing it from any slot it held before.
    pub fn assign(&mut self, place: Place, id: CandidateId) {
        if let Some(previous) = self.slot_of(&id) {
            self.0[previous] = None;
        }
        self.0[place.slot()] = Some(id);
    }

    pub fn clear(&mut self, place: Place) {
        self.0[place.slot()] = None;
    }

    /// Resolve a round against the active set.
    ///
    /// An id that is not present in `candidates` resolves to `None`,
    /// the same as an unassigned slot.
    pub fn resolve<'a>(&self, round: usize, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        self.get(round).and_then(|id| find_candidate(candidates, id))
    }

    /// Number of assigned slots
    pub fn assigned_count(&self) -> usize {
        self.0.iter().flatten().count()
    }

    /// No id appears in more than one slot
    pub fn is_unique(&self) -> bool {
        let ids: Vec<_> = self.0.iter().flatten().collect();
        ids.iter()
            .enumerate()
            .all(|(i, id)| !ids[i + 1..].contains(id))
    }
}
