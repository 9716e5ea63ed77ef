//! Progressive-stake ("Soros") simulation engine.
//!
//! - [`LevelLadder`] derives the ordered stake levels for a configuration.
//! - [`ProgressionEngine`] is the live state machine: it advances the
//!   ladder on wins, ends the round on losses, and appends every outcome
//!   to an [`soros_ledger::OutcomeStore`].
//! - [`SharedEngine`] serializes access to one engine from many tasks.
//!
//! Replay of persisted history lives in `soros-ledger`
//! ([`soros_ledger::LedgerReconciler`]). The engine settles its live
//! balance from its own ladder state; `tests/live_replay_equivalence.rs`
//! checks that both arrive at the same balances.

pub mod engine;
pub mod error;
pub mod ladder;
pub mod level;
pub mod shared;

pub use engine::{EngineSnapshot, ProgressionEngine, RecordedOutcome, RoundEnd, RoundState};
pub use error::{EngineError, EngineResult};
pub use ladder::{ChainRule, LevelLadder};
pub use level::{Level, LevelStatus};
pub use shared::SharedEngine;
