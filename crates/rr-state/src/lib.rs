//! rr-state: Persistence of the raffle state
//!
//! A single versioned record in a durable key-value store:
//! - `StateRecord`: tolerant load, full-record save
//! - `FileStore` / `MemoryStore`: storage backends
//! - `StatePersister`: machine observer that saves after every change

mod error;
mod persister;
mod record;
mod store;

pub use error::*;
pub use persister::*;
pub use record::*;
pub use store::*;
