//! Target resolution for a spin

use rand::Rng;
use rand::seq::IndexedRandom;

use rr_core::{Candidate, Resolution, WinnersConfig};

/// Resolve the winner of `round`.
///
/// 1. A slot naming a candidate of the active set wins outright.
/// 2. Otherwise draw uniformly among candidates not assigned to any slot.
///    This only keeps rigged winners out of open rounds; two open rounds
///    can still draw the same candidate.
/// 3. If every candidate is assigned somewhere, take the first one.
///
/// `None` only for an empty candidate set.
pub fn resolve_target<R: Rng + ?Sized>(
    round: usize,
    config: &WinnersConfig,
    candidates: &[Candidate],
    rng: &mut R,
) -> Option<(Candidate, Resolution)> {
    if let Some(rigged) = config.resolve(round, candidates) {
        return Some((rigged.clone(), Resolution::Rigged));
    }
    if let Some(stale) = config.get(round) {
        log::warn!(
            "[Machine] Slot {} names '{}' which is not in the active set; drawing instead",
            round,
            stale
        );
    }

    let available: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| !config.contains(&c.id))
        .collect();

    match available.choose(rng) {
        Some(drawn) => Some(((*drawn).clone(), Resolution::Drawn)),
        None => candidates.first().map(|c| (c.clone(), Resolution::Fallback)),
    }
}
