//! # rr-machine — Reel Raffle state machine
//!
//! Drives the three-round reveal: 3rd place, then 2nd, then 1st.
//! Each round is either rigged through the winners config or drawn at
//! random from the candidates nobody was assigned to.
//!
//! ## Architecture
//!
//! ```text
//! RaffleMachine (Arc<Mutex<MachineState>>)
//!     │
//!     ├── default set / custom set (one active)
//!     ├── WinnersConfig (3 optional slots)
//!     ├── revealed_count, is_spinning, current_winner
//!     └── TimingConfig (spin duration, reel stagger)
//!           │
//!           v
//!     spin() → timer task → SpinHandle
//!           │
//!           v
//!     MachineEvent + MachineSnapshot → observers / broadcast
//!                                      (StatePersister saves)
//! ```

pub mod config;
pub mod draw;
pub mod machine;
pub mod reel;
pub mod spin;
pub mod timing;

pub use config::*;
pub use draw::*;
pub use machine::*;
pub use reel::*;
pub use spin::*;
pub use timing::*;
