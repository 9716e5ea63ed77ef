//! Append-only outcome ledger for the Soros journal.
//!
//! This crate owns everything that happens to an outcome after it has been
//! recorded. It provides:
//! - `OutcomeRecord` / `ReconciledRecord` record types
//! - The `OutcomeStore` persistence boundary
//! - `InMemoryOutcomeStore` for tests, demos, and embedding
//! - `LedgerReconciler`: deterministic replay of running and settled balances
//! - `LedgerValidator`: consistency checks over a persisted history
//! - `JournalProjection`: summary statistics over a reconciled trail

pub mod error;
pub mod memory;
pub mod projection;
pub mod reconcile;
pub mod records;
pub mod traits;
pub mod validation;

pub use error::{LedgerError, StoreError, StoreResult};
pub use memory::InMemoryOutcomeStore;
pub use projection::{JournalProjection, JournalSummary};
pub use reconcile::{Baseline, LedgerReconciler, SettledStep};
pub use records::{profit_loss_for, NewOutcome, OutcomeRecord, ReconciledRecord};
pub use traits::OutcomeStore;
pub use validation::{LedgerValidator, ValidationReport, Violation, ViolationKind};
