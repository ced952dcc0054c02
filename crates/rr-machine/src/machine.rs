//! Raffle Machine: winner selection and reveal sequencing

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use rr_core::{
    Candidate, CandidateId, MachineEvent, MachineObserver, MachineSnapshot, Place, ROUND_COUNT,
    RaffleError, RaffleResult, Resolution, RosterConfig, WinnersConfig, find_candidate,
    validate_candidates,
};
use rr_state::{KeyValueStore, StatePersister, StateRecord, load_record};

use crate::config::MachineConfig;
use crate::draw::resolve_target;
use crate::reel::{REEL_COUNT, ReelStrip};
use crate::spin::SpinHandle;
use crate::timing::TimingConfig;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Mutable machine state, guarded by one lock
struct MachineState {
    /// Generated default set (active when `use_custom_images` is false)
    default_set: Vec<Candidate>,
    /// Custom set: preset list or uploads
    custom_set: Vec<Candidate>,
    use_custom_images: bool,
    winners_config: WinnersConfig,
    revealed_count: usize,
    is_spinning: bool,
    current_winner: Option<Candidate>,
    revealed: [Option<Candidate>; ROUND_COUNT],
    revision: u64,
    rng: StdRng,
}

impl MachineState {
    fn from_record(record: StateRecord, roster: &RosterConfig, rng: StdRng) -> Self {
        let (default_set, custom_set) = if record.use_custom_images {
            (roster.default_candidates(), record.candidates)
        } else {
            (record.candidates, roster.custom_candidates())
        };

        Self {
            default_set,
            custom_set,
            use_custom_images: record.use_custom_images,
            winners_config: record.winners_config,
            revealed_count: record.revealed_count.min(ROUND_COUNT),
            is_spinning: false,
            current_winner: None,
            revealed: Default::default(),
            revision: 0,
            rng,
        }
    }

    fn active(&self) -> &[Candidate] {
        if self.use_custom_images {
            &self.custom_set
        } else {
            &self.default_set
        }
    }

    fn active_mut(&mut self) -> &mut Vec<Candidate> {
        if self.use_custom_images {
            &mut self.custom_set
        } else {
            &mut self.default_set
        }
    }

    fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            candidates: self.active().to_vec(),
            winners_config: self.winners_config.clone(),
            revealed_count: self.revealed_count,
            is_spinning: self.is_spinning,
            current_winner: self.current_winner.clone(),
            use_custom_images: self.use_custom_images,
            revealed: self.revealed.clone(),
            revision: self.revision,
        }
    }

    /// Record a completed change and snapshot it
    fn commit(&mut self) -> MachineSnapshot {
        self.revision += 1;
        self.snapshot()
    }
}

struct Shared {
    state: Mutex<MachineState>,
    observers: RwLock<Vec<Arc<dyn MachineObserver>>>,
    events: broadcast::Sender<MachineEvent>,
    timing: RwLock<TimingConfig>,
    runtime: Option<Handle>,
}

/// The raffle state machine
///
/// Cheap to clone; all clones drive the same machine. Every operation runs
/// to completion under the state lock, then observers and event subscribers
/// are notified with a snapshot taken inside that lock.
#[derive(Clone)]
pub struct RaffleMachine {
    shared: Arc<Shared>,
}

impl RaffleMachine {
    /// Fresh machine with default config and no persistence
    pub fn new() -> Self {
        MachineBuilder::new().build()
    }

    pub fn builder() -> MachineBuilder {
        MachineBuilder::new()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OBSERVATION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn snapshot(&self) -> MachineSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Active candidate set
    pub fn candidates(&self) -> Vec<Candidate> {
        self.shared.state.lock().active().to_vec()
    }

    pub fn winners_config(&self) -> WinnersConfig {
        self.shared.state.lock().winners_config.clone()
    }

    pub fn revealed_count(&self) -> usize {
        self.shared.state.lock().revealed_count
    }

    pub fn is_spinning(&self) -> bool {
        self.shared.state.lock().is_spinning
    }

    pub fn current_winner(&self) -> Option<Candidate> {
        self.shared.state.lock().current_winner.clone()
    }

    pub fn use_custom_images(&self) -> bool {
        self.shared.state.lock().use_custom_images
    }

    /// Register an observer; it sees every change from now on
    pub fn add_observer(&self, observer: Arc<dyn MachineObserver>) {
        self.shared.observers.write().push(observer);
    }

    /// Subscribe to machine events
    pub fn subscribe(&self) -> broadcast::Receiver<MachineEvent> {
        self.shared.events.subscribe()
    }

    pub fn timing(&self) -> TimingConfig {
        self.shared.timing.read().clone()
    }

    pub fn set_timing(&self, timing: TimingConfig) {
        *self.shared.timing.write() = timing;
    }

    /// Seed the RNG for reproducible draws
    pub fn seed(&self, seed: u64) {
        self.shared.state.lock().rng = StdRng::seed_from_u64(seed);
    }

    /// Fresh shuffled strips for the spinning reels
    pub fn reel_strips(&self) -> Vec<ReelStrip> {
        let length = self.shared.timing.read().strip_length;
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        let candidates = if state.use_custom_images {
            &state.custom_set
        } else {
            &state.default_set
        };
        (0..REEL_COUNT)
            .map(|_| ReelStrip::shuffled(candidates, length, &mut state.rng))
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════

    /// Start a spin.
    ///
    /// Returns `None` without touching any state when a spin is already
    /// running, all rounds are revealed, the active set is empty, or no
    /// tokio runtime is available to run the timer.
    pub fn spin(&self) -> Option<SpinHandle> {
        let Some(runtime) = self.shared.runtime.clone().or_else(|| Handle::try_current().ok())
        else {
            log::error!("[Machine] No runtime available to time the spin");
            return None;
        };
        let duration = self.shared.timing.read().spin_duration();

        let (round, target, resolution, snapshot) = {
            let mut guard = self.shared.state.lock();
            let state = &mut *guard;

            if state.is_spinning {
                log::debug!("[Machine] Spin rejected: already spinning");
                return None;
            }
            if state.revealed_count >= ROUND_COUNT {
                log::debug!("[Machine] Spin rejected: all rounds revealed");
                return None;
            }

            let round = state.revealed_count;
            let candidates = if state.use_custom_images {
                &state.custom_set
            } else {
                &state.default_set
            };
            let Some((target, resolution)) =
                resolve_target(round, &state.winners_config, candidates, &mut state.rng)
            else {
                log::warn!("[Machine] Spin rejected: no candidates");
                return None;
            };

            state.is_spinning = true;
            state.current_winner = None;
            (round, target, resolution, state.commit())
        };

        let place = Place::from_round(round).unwrap_or(Place::First);
        log::info!("[Machine] Spinning for {} ({:?})", place, resolution);
        self.notify(&[MachineEvent::SpinStarted { round, place }], &snapshot);

        let (winner_tx, winner_rx) = oneshot::channel();
        let machine = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let winner = machine.complete_spin(round, target, resolution);
            // The caller may have dropped its handle
            let _ = winner_tx.send(winner);
        });

        Some(SpinHandle::new(round, place, winner_rx))
    }

    fn complete_spin(&self, round: usize, winner: Candidate, resolution: Resolution) -> Candidate {
        let (revealed_round, snapshot) = {
            let mut state = self.shared.state.lock();
            // A reset during the spin moves the reveal to the current round
            let revealed_round = state.revealed_count.min(ROUND_COUNT - 1);
            if revealed_round != round {
                log::warn!(
                    "[Machine] Progress changed during spin (round {} -> {})",
                    round,
                    revealed_round
                );
            }

            state.is_spinning = false;
            state.revealed_count = (state.revealed_count + 1).min(ROUND_COUNT);
            state.current_winner = Some(winner.clone());
            state.revealed[revealed_round] = Some(winner.clone());
            (revealed_round, state.commit())
        };

        let place = Place::from_round(revealed_round).unwrap_or(Place::First);
        log::info!("[Machine] {} winner: {} ({})", place, winner.name, winner.id);
        self.notify(
            &[MachineEvent::SpinCompleted {
                round: revealed_round,
                place,
                winner: winner.clone(),
                resolution,
            }],
            &snapshot,
        );
        winner
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CONFIGURATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Clear progress; candidates and winner slots are kept
    pub fn reset_game(&self) {
        let snapshot = {
            let mut state = self.shared.state.lock();
            state.revealed_count = 0;
            state.current_winner = None;
            state.revealed = Default::default();
            state.commit()
        };
        log::info!("[Machine] Game reset");
        self.notify(&[MachineEvent::GameReset], &snapshot);
    }

    /// Replace all winner slots. The caller keeps ids unique across slots.
    pub fn update_winners_config(&self, config: WinnersConfig) {
        if !config.is_unique() {
            log::warn!("[Machine] Winners config assigns one candidate to several slots");
        }
        let snapshot = {
            let mut state = self.shared.state.lock();
            state.winners_config = config;
            state.commit()
        };
        self.notify(&[MachineEvent::WinnersConfigUpdated], &snapshot);
    }

    /// Rig a place for a candidate of the active set, moving it out of any
    /// other slot.
    pub fn assign_winner(&self, place: Place, id: &CandidateId) -> RaffleResult<()> {
        let mut config = {
            let state = self.shared.state.lock();
            if find_candidate(state.active(), id).is_none() {
                return Err(RaffleError::UnknownCandidate(id.clone()));
            }
            state.winners_config.clone()
        };
        config.assign(place, id.clone());
        log::info!("[Machine] {} rigged for {}", place, id);
        self.update_winners_config(config);
        Ok(())
    }

    /// Unassign one place
    pub fn clear_winner(&self, place: Place) {
        let mut config = self.winners_config();
        config.clear(place);
        self.update_winners_config(config);
    }

    /// Replace the active candidate set.
    ///
    /// Winner slots are not reconciled: ids missing from the new set resolve
    /// to "no assigned winner".
    pub fn update_candidates(&self, candidates: Vec<Candidate>) -> RaffleResult<()> {
        validate_candidates(&candidates)?;
        let count = candidates.len();
        let snapshot = {
            let mut state = self.shared.state.lock();
            *state.active_mut() = candidates;
            state.commit()
        };
        log::info!("[Machine] Candidate set replaced ({} candidates)", count);
        self.notify(&[MachineEvent::CandidatesUpdated { count }], &snapshot);
        Ok(())
    }

    /// Switch between the default and the custom candidate set.
    ///
    /// Winner slots are kept; ids from the other set become unresolved.
    pub fn toggle_data_source(&self, use_custom_images: bool) {
        let (count, snapshot) = {
            let mut state = self.shared.state.lock();
            state.use_custom_images = use_custom_images;
            (state.active().len(), state.commit())
        };
        log::info!(
            "[Machine] Data source: {} ({} candidates)",
            if use_custom_images { "custom" } else { "default" },
            count
        );
        self.notify(
            &[
                MachineEvent::DataSourceChanged { use_custom_images },
                MachineEvent::CandidatesUpdated { count },
            ],
            &snapshot,
        );
    }

    /// Install a new custom set (uploads) and make it active
    pub fn adopt_custom_candidates(&self, candidates: Vec<Candidate>) -> RaffleResult<()> {
        validate_candidates(&candidates)?;
        let count = candidates.len();
        let (switched, snapshot) = {
            let mut state = self.shared.state.lock();
            let switched = !state.use_custom_images;
            state.custom_set = candidates;
            state.use_custom_images = true;
            (switched, state.commit())
        };
        log::info!("[Machine] Custom set installed ({} candidates)", count);

        let mut events = vec![MachineEvent::CandidatesUpdated { count }];
        if switched {
            events.push(MachineEvent::DataSourceChanged {
                use_custom_images: true,
            });
        }
        self.notify(&events, &snapshot);
        Ok(())
    }

    fn notify(&self, events: &[MachineEvent], snapshot: &MachineSnapshot) {
        let observers = self.shared.observers.read().clone();
        for event in events {
            log::debug!("[Machine] {}", event.type_name());
            for observer in &observers {
                observer.on_event(event, snapshot);
            }
            // No subscribers is fine
            let _ = self.shared.events.send(event.clone());
        }
    }
}

impl Default for RaffleMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════

/// Machine builder
pub struct MachineBuilder {
    config: MachineConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    runtime: Option<Handle>,
    observers: Vec<Arc<dyn MachineObserver>>,
}

impl MachineBuilder {
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            store: None,
            runtime: None,
            observers: Vec::new(),
        }
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Restore from and persist to this store
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Runtime for spin timers (defaults to the caller's runtime at spin time)
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn MachineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn build(self) -> RaffleMachine {
        let roster = &self.config.roster;
        let record = match &self.store {
            Some(store) => load_record(store.as_ref(), &self.config.storage_key, roster),
            None => StateRecord::defaults(roster),
        };

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut observers = self.observers;
        if let Some(store) = self.store {
            observers.push(Arc::new(StatePersister::new(store, self.config.storage_key.clone())));
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        RaffleMachine {
            shared: Arc::new(Shared {
                state: Mutex::new(MachineState::from_record(record, roster, rng)),
                observers: RwLock::new(observers),
                events,
                timing: RwLock::new(self.config.timing()),
                runtime: self.runtime,
            }),
        }
    }
}

impl Default for MachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
