use async_trait::async_trait;
use soros_types::LineageId;

use crate::error::StoreResult;
use crate::records::{NewOutcome, OutcomeRecord};

/// Persistence boundary for outcome records.
///
/// All implementations must satisfy these invariants:
/// - Records are immutable once appended; the engine never edits or
///   deletes through this interface.
/// - `append` assigns a unique `RecordId` and a `RecordedAt` strictly after
///   every earlier record of the same lineage.
/// - `list_ordered` returns a lineage's records sorted by `recorded_at`
///   ascending (ties broken by id).
/// - Failures are returned, never swallowed; the caller decides on retries.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Append an outcome to a lineage and return the stored record.
    async fn append(&self, lineage: &LineageId, outcome: NewOutcome) -> StoreResult<OutcomeRecord>;

    /// All records of a lineage in replay order. Unknown lineages are empty.
    async fn list_ordered(&self, lineage: &LineageId) -> StoreResult<Vec<OutcomeRecord>>;
}
