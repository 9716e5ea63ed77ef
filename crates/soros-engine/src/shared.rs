use std::sync::Arc;

use soros_ledger::OutcomeStore;
use soros_types::{Money, Outcome, Percent};
use tokio::sync::{Mutex, MutexGuard};

use crate::engine::{EngineSnapshot, ProgressionEngine, RecordedOutcome};
use crate::error::EngineResult;

/// A progression engine shared between tasks.
///
/// Every operation takes the engine's lock for its whole duration,
/// including the store round-trip of `record_outcome`, so outcomes against
/// one ladder are applied strictly one after another.
pub struct SharedEngine<S> {
    inner: Arc<Mutex<ProgressionEngine<S>>>,
}

impl<S> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: OutcomeStore> SharedEngine<S> {
    pub fn new(engine: ProgressionEngine<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub async fn record_outcome(&self, outcome: Outcome) -> EngineResult<RecordedOutcome> {
        self.inner.lock().await.record_outcome(outcome).await
    }

    pub async fn set_payout(&self, payout: Percent) -> EngineResult<()> {
        self.inner.lock().await.set_payout(payout)
    }

    pub async fn set_level_payout(&self, index: u32, payout: Percent) -> EngineResult<()> {
        self.inner.lock().await.set_level_payout(index, payout)
    }

    pub async fn set_level_entry_value(&self, index: u32, entry_value: Money) -> EngineResult<()> {
        self.inner.lock().await.set_level_entry_value(index, entry_value)
    }

    pub async fn reset(&self) {
        self.inner.lock().await.reset();
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Exclusive access for sequences of operations that must not interleave.
    pub async fn lock(&self) -> MutexGuard<'_, ProgressionEngine<S>> {
        self.inner.lock().await
    }
}
