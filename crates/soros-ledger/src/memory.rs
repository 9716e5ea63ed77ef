use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use soros_types::{LineageId, RecordId, RecordedAt};

use crate::error::{StoreError, StoreResult};
use crate::records::{NewOutcome, OutcomeRecord};
use crate::traits::OutcomeStore;

/// In-memory outcome store for tests, local demos, and embedding.
#[derive(Default)]
pub struct InMemoryOutcomeStore {
    inner: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    streams: HashMap<LineageId, Vec<OutcomeRecord>>,
    last_stamp: Option<RecordedAt>,
}

impl InMemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a stored record wholesale, matched by id. Returns the old record.
    ///
    /// This is the only way history changes. The replacement must belong to
    /// the same lineage and is expected to come from
    /// [`OutcomeRecord::amended`], which recomputes `profit_loss`.
    pub fn replace(&self, record: OutcomeRecord) -> StoreResult<OutcomeRecord> {
        let mut state = self.write()?;
        let stream = state
            .streams
            .get_mut(&record.lineage)
            .ok_or_else(|| StoreError::RecordNotFound(record.id.clone()))?;
        let slot = stream
            .iter_mut()
            .find(|existing| existing.id == record.id)
            .ok_or_else(|| StoreError::RecordNotFound(record.id.clone()))?;
        Ok(std::mem::replace(slot, record))
    }

    /// Import an already-stored record (e.g. from an export), keeping its identity.
    pub fn import(&self, lineage: &LineageId, record: OutcomeRecord) -> StoreResult<()> {
        if &record.lineage != lineage {
            return Err(StoreError::LineageMismatch {
                expected: lineage.clone(),
                found: record.lineage,
            });
        }
        let mut state = self.write()?;
        if state.last_stamp.map_or(true, |last| record.recorded_at > last) {
            state.last_stamp = Some(record.recorded_at);
        }
        state.streams.entry(lineage.clone()).or_default().push(record);
        Ok(())
    }

    /// Lineages that hold at least one record.
    pub fn lineages(&self) -> StoreResult<Vec<LineageId>> {
        let state = self.read()?;
        let mut lineages: Vec<_> = state.streams.keys().cloned().collect();
        lineages.sort();
        Ok(lineages)
    }

    pub fn record_count(&self, lineage: &LineageId) -> StoreResult<usize> {
        Ok(self.read()?.streams.get(lineage).map_or(0, Vec::len))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store read lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store write lock poisoned".into()))
    }
}

#[async_trait]
impl OutcomeStore for InMemoryOutcomeStore {
    async fn append(&self, lineage: &LineageId, outcome: NewOutcome) -> StoreResult<OutcomeRecord> {
        let mut state = self.write()?;
        let recorded_at = RecordedAt::next_after(state.last_stamp.as_ref());
        state.last_stamp = Some(recorded_at);

        let record = OutcomeRecord::from_new(RecordId::new(), lineage.clone(), recorded_at, outcome);
        state
            .streams
            .entry(lineage.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn list_ordered(&self, lineage: &LineageId) -> StoreResult<Vec<OutcomeRecord>> {
        let state = self.read()?;
        let mut records = state.streams.get(lineage).cloned().unwrap_or_default();
        records.sort_by(|a, b| a.order_key().cmp(&b.order_key()));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use soros_types::{Money, Outcome, Percent};

    use super::*;

    fn win(level: u32) -> NewOutcome {
        NewOutcome::settle(level, Money::from_units(10), Percent::from_whole(80), Outcome::Win)
    }

    #[tokio::test]
    async fn append_assigns_increasing_stamps() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();

        let first = store.append(&lineage, win(1)).await.unwrap();
        let second = store.append(&lineage, win(2)).await.unwrap();

        assert!(second.recorded_at > first.recorded_at);
        assert_ne!(first.id, second.id);
        assert_eq!(first.lineage, lineage);
        assert_eq!(store.record_count(&lineage).unwrap(), 2);
    }

    #[tokio::test]
    async fn lineages_are_isolated() {
        let store = InMemoryOutcomeStore::new();
        let a = LineageId::ephemeral();
        let b = LineageId::ephemeral();

        store.append(&a, win(1)).await.unwrap();
        store.append(&b, win(1)).await.unwrap();
        store.append(&b, win(2)).await.unwrap();

        assert_eq!(store.list_ordered(&a).await.unwrap().len(), 1);
        assert_eq!(store.list_ordered(&b).await.unwrap().len(), 2);
        assert_eq!(store.lineages().unwrap().len(), 2);
        assert!(store.list_ordered(&LineageId::ephemeral()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_ordered_sorts_imported_history() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();
        let late = OutcomeRecord::from_new(RecordId::new(), lineage.clone(), RecordedAt::new(200, 0), win(2));
        let early = OutcomeRecord::from_new(RecordId::new(), lineage.clone(), RecordedAt::new(100, 0), win(1));

        store.import(&lineage, late.clone()).unwrap();
        store.import(&lineage, early.clone()).unwrap();

        let listed = store.list_ordered(&lineage).await.unwrap();
        assert_eq!(listed, vec![early, late]);
    }

    #[tokio::test]
    async fn import_rejects_foreign_lineage() {
        let store = InMemoryOutcomeStore::new();
        let record = OutcomeRecord::from_new(RecordId::new(), LineageId::ephemeral(), RecordedAt::zero(), win(1));
        let err = store.import(&LineageId::ephemeral(), record).unwrap_err();
        assert!(matches!(err, StoreError::LineageMismatch { .. }));
    }

    #[tokio::test]
    async fn replace_swaps_record_wholesale() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();
        let original = store.append(&lineage, win(1)).await.unwrap();

        let amended = original.amended(Money::from_units(10), Percent::from_whole(80), Outcome::Loss);
        let previous = store.replace(amended.clone()).unwrap();

        assert_eq!(previous, original);
        assert_eq!(store.list_ordered(&lineage).await.unwrap(), vec![amended]);
    }

    #[tokio::test]
    async fn replace_unknown_record_fails() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();
        store.append(&lineage, win(1)).await.unwrap();
        let stranger = OutcomeRecord::from_new(RecordId::new(), lineage, RecordedAt::zero(), win(1));
        assert!(matches!(
            store.replace(stranger),
            Err(StoreError::RecordNotFound(_))
        ));
    }
}
