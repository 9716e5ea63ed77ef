//! Foundation types for the Soros progressive-stake journal.
//!
//! Every other crate in the workspace depends on `soros-types`. Monetary
//! arithmetic is fixed-point throughout so that the live engine and the
//! ledger reconciler round identically.
//!
//! # Key Types
//!
//! - [`Money`] — Signed amount in integer cents
//! - [`Percent`] — Payout ratio in basis points
//! - [`expected_profit`] — The single rounding rule for level payouts
//! - [`Outcome`] — Win or loss of one staked level
//! - [`LineageId`] — Identity of a ledger (user + configuration)
//! - [`RecordId`] / [`RecordedAt`] — Identity and replay order of a record
//! - [`SimulationConfig`] — User-editable parameters of a simulation run

pub mod config;
pub mod error;
pub mod identity;
pub mod money;
pub mod outcome;
pub mod temporal;

pub use config::{LadderShape, SimulationConfig};
pub use error::{ConfigError, TypeError};
pub use identity::{LineageId, RecordId};
pub use money::{expected_profit, Money, Percent};
pub use outcome::Outcome;
pub use temporal::RecordedAt;
