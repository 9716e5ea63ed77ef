use soros_types::{LineageId, Money, Outcome, SimulationConfig};
use tracing::debug;

use crate::error::StoreResult;
use crate::records::{OutcomeRecord, ReconciledRecord};
use crate::traits::OutcomeStore;

/// Balances derived for one settled outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettledStep {
    pub running_balance: Money,
    pub settled_balance: Money,
}

/// The balance a lineage carries from one outcome into the next.
///
/// Replay feeds it `(level, outcome, profit_loss)` in ledger order. It
/// only sees persisted fields, never a ladder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Baseline {
    current: Money,
    /// `Some(protection_value)` when the lineage runs with protection.
    protection: Option<Money>,
}

impl Baseline {
    /// Seed a fresh lineage from its configuration.
    pub fn seed(config: &SimulationConfig) -> Self {
        Self {
            current: config.starting_baseline(),
            protection: config.use_protection.then_some(config.protection_value),
        }
    }

    /// The baseline the next outcome settles against.
    pub fn current(&self) -> Money {
        self.current
    }

    /// Settle one outcome and advance the baseline.
    ///
    /// With protection, level 0 always settles back to the protection
    /// value, level >= 1 wins compound, and level >= 1 losses fall back to
    /// the protection value. Without protection, wins compound and losses
    /// settle at the running balance floored at zero.
    pub fn settle(&mut self, level: u32, outcome: Outcome, profit_loss: Money) -> SettledStep {
        let running_balance = self.current + profit_loss;
        let settled_balance = match (self.protection, outcome) {
            (Some(protection), _) if level == 0 => protection,
            (Some(_), Outcome::Win) => running_balance,
            (Some(protection), Outcome::Loss) => protection,
            (None, Outcome::Win) => running_balance,
            (None, Outcome::Loss) => running_balance.max(Money::ZERO),
        };
        self.current = settled_balance;
        SettledStep {
            running_balance,
            settled_balance,
        }
    }
}

/// Replays persisted outcome records into a balance trail.
///
/// The reconciler never consults a live engine: everything it produces is
/// derived from the records and the lineage configuration.
pub struct LedgerReconciler;

impl LedgerReconciler {
    /// Reconcile a lineage's records.
    ///
    /// Records are replayed in `(recorded_at, id)` order regardless of the
    /// order they are passed in; the output follows replay order.
    pub fn reconcile(config: &SimulationConfig, records: &[OutcomeRecord]) -> Vec<ReconciledRecord> {
        let mut ordered: Vec<&OutcomeRecord> = records.iter().collect();
        ordered.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

        let mut baseline = Baseline::seed(config);
        let reconciled: Vec<ReconciledRecord> = ordered
            .into_iter()
            .map(|record| {
                let step = baseline.settle(record.level, record.outcome, record.profit_loss);
                ReconciledRecord {
                    record: record.clone(),
                    running_balance: step.running_balance,
                    settled_balance: step.settled_balance,
                }
            })
            .collect();

        debug!(
            records = reconciled.len(),
            final_balance = %baseline.current(),
            "reconciled ledger"
        );
        reconciled
    }

    /// Load a lineage from the store and reconcile it.
    pub async fn reconcile_stored<S: OutcomeStore + ?Sized>(
        store: &S,
        lineage: &LineageId,
        config: &SimulationConfig,
    ) -> StoreResult<Vec<ReconciledRecord>> {
        let records = store.list_ordered(lineage).await?;
        Ok(Self::reconcile(config, &records))
    }

    /// Settled balance after the whole ledger, or the starting baseline if empty.
    pub fn final_balance(config: &SimulationConfig, records: &[OutcomeRecord]) -> Money {
        Self::reconcile(config, records)
            .last()
            .map_or(config.starting_baseline(), |r| r.settled_balance)
    }
}

#[cfg(test)]
mod tests {
    use soros_types::{Percent, RecordId, RecordedAt};

    use super::*;
    use crate::memory::InMemoryOutcomeStore;
    use crate::records::NewOutcome;

    fn protected() -> SimulationConfig {
        SimulationConfig {
            initial_value: Money::from_units(10),
            payout_percent: Percent::from_whole(80),
            use_protection: true,
            protection_value: Money::from_units(10),
            ..Default::default()
        }
    }

    fn unprotected() -> SimulationConfig {
        SimulationConfig {
            initial_value: Money::from_units(10),
            payout_percent: Percent::from_whole(80),
            ..Default::default()
        }
    }

    fn record(seq: u64, level: u32, entry_cents: i64, outcome: Outcome) -> OutcomeRecord {
        OutcomeRecord::from_new(
            RecordId::new(),
            LineageId::from_hex(&"00".repeat(32)).unwrap(),
            RecordedAt::new(seq, 0),
            NewOutcome::settle(level, Money::from_cents(entry_cents), Percent::from_whole(80), outcome),
        )
    }

    fn balances(trail: &[ReconciledRecord]) -> Vec<(i64, i64)> {
        trail
            .iter()
            .map(|r| (r.running_balance.cents(), r.settled_balance.cents()))
            .collect()
    }

    #[test]
    fn protection_level_zero_always_settles_to_protection_value() {
        let trail = LedgerReconciler::reconcile(
            &protected(),
            &[
                record(1, 0, 1000, Outcome::Win),
                record(2, 0, 1000, Outcome::Loss),
            ],
        );
        assert_eq!(balances(&trail), vec![(1800, 1000), (0, 1000)]);
    }

    #[test]
    fn protection_forward_wins_compound_and_losses_revert() {
        let trail = LedgerReconciler::reconcile(
            &protected(),
            &[
                record(1, 0, 1000, Outcome::Win),
                record(2, 1, 1800, Outcome::Win),
                record(3, 2, 1440, Outcome::Win),
                record(4, 3, 1152, Outcome::Loss),
            ],
        );
        assert_eq!(
            balances(&trail),
            vec![(1800, 1000), (2440, 2440), (3592, 3592), (2440, 1000)]
        );
    }

    #[test]
    fn unprotected_loss_floors_at_zero() {
        let trail = LedgerReconciler::reconcile(
            &unprotected(),
            &[
                record(1, 1, 1000, Outcome::Win),
                record(2, 2, 1800, Outcome::Loss),
                record(3, 1, 1000, Outcome::Loss),
            ],
        );
        // 10 + 8 = 18; 18 - 18 = 0; 0 - 10 = -10 floored to 0.
        assert_eq!(balances(&trail), vec![(1800, 1800), (0, 0), (-1000, 0)]);
        assert!(trail.iter().all(|r| !r.settled_balance.is_negative()));
    }

    #[test]
    fn unordered_input_replays_in_timestamp_order() {
        let first = record(1, 1, 1000, Outcome::Win);
        let second = record(2, 2, 1800, Outcome::Win);
        let ordered = LedgerReconciler::reconcile(&unprotected(), &[first.clone(), second.clone()]);
        let shuffled = LedgerReconciler::reconcile(&unprotected(), &[second, first]);
        assert_eq!(ordered, shuffled);
        assert_eq!(ordered[0].record.level, 1);
    }

    #[test]
    fn empty_ledger_has_starting_balance() {
        assert!(LedgerReconciler::reconcile(&protected(), &[]).is_empty());
        assert_eq!(
            LedgerReconciler::final_balance(&protected(), &[]),
            Money::from_units(10)
        );
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let records = vec![
            record(1, 1, 1000, Outcome::Win),
            record(2, 2, 1800, Outcome::Loss),
        ];
        assert_eq!(
            LedgerReconciler::reconcile(&unprotected(), &records),
            LedgerReconciler::reconcile(&unprotected(), &records)
        );
    }

    #[test]
    fn baseline_settle_tracks_current() {
        let mut baseline = Baseline::seed(&unprotected());
        assert_eq!(baseline.current(), Money::from_units(10));
        let step = baseline.settle(1, Outcome::Win, Money::from_units(8));
        assert_eq!(step.settled_balance, Money::from_units(18));
        assert_eq!(baseline.current(), Money::from_units(18));
    }

    #[test]
    fn extreme_amounts_clamp_instead_of_overflowing() {
        let mut huge = record(1, 1, 1000, Outcome::Win);
        huge.profit_loss = Money::from_cents(i64::MAX);
        let mut sink = record(2, 2, 1000, Outcome::Loss);
        sink.profit_loss = Money::from_cents(i64::MIN);

        let trail = LedgerReconciler::reconcile(&unprotected(), &[huge, sink]);
        assert_eq!(trail[0].running_balance, Money::from_cents(i64::MAX));
        assert_eq!(trail[0].settled_balance, Money::from_cents(i64::MAX));
        assert_eq!(trail[1].running_balance, Money::from_cents(-1));
        assert_eq!(trail[1].settled_balance, Money::ZERO);
    }

    #[tokio::test]
    async fn reconcile_stored_reads_from_store() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();
        let config = unprotected();
        store
            .append(&lineage, NewOutcome::settle(1, Money::from_units(10), Percent::from_whole(80), Outcome::Win))
            .await
            .unwrap();

        let trail = LedgerReconciler::reconcile_stored(&store, &lineage, &config)
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].settled_balance, Money::from_units(18));
    }

    #[tokio::test]
    async fn amended_history_reconciles_with_new_values() {
        let store = InMemoryOutcomeStore::new();
        let lineage = LineageId::ephemeral();
        let config = unprotected();
        let recorded = store
            .append(&lineage, NewOutcome::settle(1, Money::from_units(10), Percent::from_whole(80), Outcome::Win))
            .await
            .unwrap();
        store
            .replace(recorded.amended(Money::from_units(10), Percent::from_whole(80), Outcome::Loss))
            .unwrap();

        let trail = LedgerReconciler::reconcile_stored(&store, &lineage, &config)
            .await
            .unwrap();
        assert_eq!(trail[0].running_balance, Money::ZERO);
        assert_eq!(trail[0].settled_balance, Money::ZERO);
    }
}
