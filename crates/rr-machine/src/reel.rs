//! Reel strips shown while a spin is running

use rand::Rng;
use rand::seq::SliceRandom;

use rr_core::Candidate;

/// Reels on the machine
pub const REEL_COUNT: usize = 3;

/// A shuffled window of the active set, cycled while the reel spins
#[derive(Debug, Clone, PartialEq)]
pub struct ReelStrip {
    candidates: Vec<Candidate>,
}

impl ReelStrip {
    /// Shuffle the set and keep at most `length` entries
    pub fn shuffled<R: Rng + ?Sized>(candidates: &[Candidate], length: usize, rng: &mut R) -> Self {
        let mut strip = candidates.to_vec();
        strip.shuffle(rng);
        strip.truncate(length.max(1));
        Self { candidates: strip }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate at a position (wraps around)
    pub fn at(&self, position: usize) -> Option<&Candidate> {
        if self.candidates.is_empty() {
            return None;
        }
        self.candidates.get(position % self.candidates.len())
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rr_core::default_candidates;

    #[test]
    fn test_strip_is_subset() {
        let set = default_candidates();
        let mut rng = StdRng::seed_from_u64(8);
        let strip = ReelStrip::shuffled(&set, 10, &mut rng);

        assert_eq!(strip.len(), 10);
        assert!(strip.candidates().iter().all(|c| set.contains(c)));
        assert_eq!(strip.at(10), strip.at(0));
    }

    #[test]
    fn test_short_set() {
        let set = vec![Candidate::new("a", "A", "")];
        let mut rng = StdRng::seed_from_u64(1);
        let strip = ReelStrip::shuffled(&set, 10, &mut rng);
        assert_eq!(strip.len(), 1);

        let empty = ReelStrip::shuffled(&[], 10, &mut rng);
        assert!(empty.is_empty());
        assert!(empty.at(3).is_none());
    }
}
