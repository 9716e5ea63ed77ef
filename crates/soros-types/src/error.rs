use thiserror::Error;

use crate::money::{Money, Percent};

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid decimal amount: {0:?}")]
    InvalidDecimal(String),

    #[error("amount {0:?} has more than two fractional digits")]
    TooPrecise(String),

    #[error("percentage cannot be negative: {0:?}")]
    NegativePercent(String),

    #[error("amount out of range: {0}")]
    OutOfRange(String),

    #[error("invalid outcome {0:?}: expected win or loss")]
    InvalidOutcome(String),
}

/// Errors raised when a simulation configuration is rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial value must be positive, got {0}")]
    NonPositiveInitialValue(Money),

    #[error("protection value must be positive when protection is enabled, got {0}")]
    NonPositiveProtectionValue(Money),

    #[error("payout must be within (0, 100] percent, got {0}")]
    PayoutOutOfRange(Percent),

    #[error("stake must be positive, got {0}")]
    NonPositiveStake(Money),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
