use soros_types::{LineageId, RecordId};

/// Errors from the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("record belongs to lineage {found}, expected {expected}")]
    LineageMismatch {
        expected: LineageId,
        found: LineageId,
    },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by ledger operations above the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
