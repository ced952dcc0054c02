//! Spin completion handle

use tokio::sync::oneshot;

use rr_core::{Candidate, Place};

/// An accepted spin
///
/// The spin is driven by a timer task owned by the machine; dropping the
/// handle does not cancel it. The handle only delivers the winner.
#[derive(Debug)]
pub struct SpinHandle {
    round: usize,
    place: Place,
    winner_rx: oneshot::Receiver<Candidate>,
}

impl SpinHandle {
    pub(crate) fn new(round: usize, place: Place, winner_rx: oneshot::Receiver<Candidate>) -> Self {
        Self {
            round,
            place,
            winner_rx,
        }
    }

    /// Round this spin reveals (0-based)
    pub fn round(&self) -> usize {
        self.round
    }

    /// Place this spin reveals
    pub fn place(&self) -> Place {
        self.place
    }

    /// Wait for the reveal.
    ///
    /// `None` only if the timer task was torn down with its runtime.
    pub async fn wait(self) -> Option<Candidate> {
        self.winner_rx.await.ok()
    }

    /// Block the current thread until the reveal.
    ///
    /// Must not be called from a thread driving the machine's runtime.
    pub fn blocking_wait(self) -> Option<Candidate> {
        self.winner_rx.blocking_recv().ok()
    }
}
