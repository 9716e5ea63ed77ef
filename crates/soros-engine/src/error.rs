use soros_ledger::StoreError;
use soros_types::ConfigError;

/// Errors produced by the progression engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// The round has ended (loss or exhausted ladder) and awaits a reset.
    #[error("no active level; reset the ladder to start a new round")]
    NoActiveLevel,

    #[error("level {0} does not exist in the ladder")]
    LevelNotFound(u32),

    #[error("level {0} is completed and can no longer be edited")]
    LevelCompleted(u32),

    /// Propagated unchanged from the outcome store.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
