use serde::{Deserialize, Serialize};
use soros_types::{Money, Outcome};

use crate::records::ReconciledRecord;

/// Journal statistics over a reconciled trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSummary {
    pub record_count: usize,
    pub wins: usize,
    pub losses: usize,
    /// Wins over total records, in basis points.
    pub win_rate_bp: u32,
    pub net_profit_loss: Money,
    /// Settled balance after the last record.
    pub final_balance: Money,
    /// Highest settled balance, including the starting baseline.
    pub peak_balance: Money,
    /// Largest fall of the settled balance below a prior peak.
    pub max_drawdown: Money,
    pub longest_win_streak: usize,
}

/// Deterministic projection builders.
pub struct JournalProjection;

impl JournalProjection {
    pub fn summarize(starting_balance: Money, trail: &[ReconciledRecord]) -> JournalSummary {
        let mut wins = 0usize;
        let mut net_profit_loss = Money::ZERO;
        let mut peak_balance = starting_balance;
        let mut max_drawdown = Money::ZERO;
        let mut streak = 0usize;
        let mut longest_win_streak = 0usize;

        for entry in trail {
            net_profit_loss += entry.record.profit_loss;
            match entry.record.outcome {
                Outcome::Win => {
                    wins += 1;
                    streak += 1;
                    longest_win_streak = longest_win_streak.max(streak);
                }
                Outcome::Loss => streak = 0,
            }
            peak_balance = peak_balance.max(entry.settled_balance);
            max_drawdown = max_drawdown.max(peak_balance - entry.settled_balance);
        }

        let record_count = trail.len();
        let win_rate_bp = if record_count == 0 {
            0
        } else {
            ((wins as u64 * 10_000) / record_count as u64) as u32
        };

        JournalSummary {
            record_count,
            wins,
            losses: record_count - wins,
            win_rate_bp,
            net_profit_loss,
            final_balance: trail
                .last()
                .map_or(starting_balance, |r| r.settled_balance),
            peak_balance,
            max_drawdown,
            longest_win_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use soros_types::{LineageId, Percent, RecordId, RecordedAt, SimulationConfig};

    use super::*;
    use crate::reconcile::LedgerReconciler;
    use crate::records::{NewOutcome, OutcomeRecord};

    fn record(seq: u64, level: u32, entry_cents: i64, outcome: Outcome) -> OutcomeRecord {
        OutcomeRecord::from_new(
            RecordId::new(),
            LineageId::from_hex(&"11".repeat(32)).unwrap(),
            RecordedAt::new(seq, 0),
            NewOutcome::settle(level, Money::from_cents(entry_cents), Percent::from_whole(80), outcome),
        )
    }

    #[test]
    fn empty_trail_summary() {
        let summary = JournalProjection::summarize(Money::from_units(10), &[]);
        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.win_rate_bp, 0);
        assert_eq!(summary.final_balance, Money::from_units(10));
        assert_eq!(summary.peak_balance, Money::from_units(10));
        assert_eq!(summary.max_drawdown, Money::ZERO);
    }

    #[test]
    fn extreme_amounts_do_not_overflow_summary() {
        let mut huge = record(1, 1, 1000, Outcome::Win);
        huge.profit_loss = Money::from_cents(i64::MAX);
        let mut sink = record(2, 2, 1000, Outcome::Loss);
        sink.profit_loss = Money::from_cents(i64::MIN);
        let trail = LedgerReconciler::reconcile(&SimulationConfig::default(), &[huge, sink]);

        let summary = JournalProjection::summarize(Money::from_units(10), &trail);
        assert_eq!(summary.peak_balance, Money::from_cents(i64::MAX));
        assert_eq!(summary.max_drawdown, Money::from_cents(i64::MAX));
        assert_eq!(summary.net_profit_loss, Money::from_cents(-1));
    }

    #[test]
    fn summary_over_reconciled_trail() {
        let config = SimulationConfig::default();
        let trail = LedgerReconciler::reconcile(
            &config,
            &[
                record(1, 1, 1000, Outcome::Win),  // 18.00
                record(2, 2, 1800, Outcome::Win),  // 32.40
                record(3, 3, 3240, Outcome::Loss), // 0.00
                record(4, 1, 1000, Outcome::Win),  // 8.00
            ],
        );
        let summary = JournalProjection::summarize(config.starting_baseline(), &trail);

        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.wins, 3);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.win_rate_bp, 7_500);
        assert_eq!(summary.net_profit_loss, Money::from_cents(800 + 1440 - 3240 + 800));
        assert_eq!(summary.final_balance, Money::from_cents(800));
        assert_eq!(summary.peak_balance, Money::from_cents(3240));
        assert_eq!(summary.max_drawdown, Money::from_cents(3240));
        assert_eq!(summary.longest_win_streak, 2);
    }
}
