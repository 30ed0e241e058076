//! Simulation layers around the codec.
//!
//! This module provides the state a learner works with while exploring the code:
//! - `memory`: an address-indexed store of encoded words (addresses 0..=1023)
//! - `history`: an append-only log of operations
//! - `session`: the workflow tying codec, memory and history together

pub mod history;
pub mod memory;
pub mod session;

pub use history::{History, HistoryEntry, Operation};
pub use memory::{Memory, MemoryCell, ADDRESS_SPACE, MAX_ADDRESS};
pub use session::{ActiveWord, Session, WriteOutcome};
