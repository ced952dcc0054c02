//! # rr-core — Core types for Reel Raffle
//!
//! Candidates, the three winner slots, rosters, and the change
//! notification contract shared by the state machine, persistence and
//! presentation layers.
//!
//! ## Reveal order
//!
//! ```text
//! round 0 → slot 0 → 3rd place
//! round 1 → slot 1 → 2nd place
//! round 2 → slot 2 → 1st place
//! ```

pub mod candidate;
pub mod error;
pub mod event;
pub mod roster;
pub mod winners;

pub use candidate::*;
pub use error::*;
pub use event::*;
pub use roster::*;
pub use winners::*;
