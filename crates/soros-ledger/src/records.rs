use serde::{Deserialize, Serialize};
use soros_types::{expected_profit, LineageId, Money, Outcome, Percent, RecordId, RecordedAt};

use crate::error::LedgerError;

/// Signed result of staking `entry_value` at `payout`:
/// `+expected_profit` on a win, `-entry_value` on a loss.
pub fn profit_loss_for(entry_value: Money, payout: Percent, outcome: Outcome) -> Money {
    match outcome {
        Outcome::Win => expected_profit(entry_value, payout),
        Outcome::Loss => -entry_value,
    }
}

/// An outcome ready to be appended, before the store assigns identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOutcome {
    pub level: u32,
    pub entry_value: Money,
    pub payout_percent: Percent,
    pub outcome: Outcome,
    pub profit_loss: Money,
}

impl NewOutcome {
    /// Build an outcome with `profit_loss` derived from the other fields.
    pub fn settle(level: u32, entry_value: Money, payout_percent: Percent, outcome: Outcome) -> Self {
        Self {
            level,
            entry_value,
            payout_percent,
            outcome,
            profit_loss: profit_loss_for(entry_value, payout_percent, outcome),
        }
    }
}

/// A persisted, immutable ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: RecordId,
    pub lineage: LineageId,
    pub recorded_at: RecordedAt,
    pub level: u32,
    pub entry_value: Money,
    pub payout_percent: Percent,
    pub outcome: Outcome,
    pub profit_loss: Money,
}

impl OutcomeRecord {
    pub fn from_new(
        id: RecordId,
        lineage: LineageId,
        recorded_at: RecordedAt,
        outcome: NewOutcome,
    ) -> Self {
        Self {
            id,
            lineage,
            recorded_at,
            level: outcome.level,
            entry_value: outcome.entry_value,
            payout_percent: outcome.payout_percent,
            outcome: outcome.outcome,
            profit_loss: outcome.profit_loss,
        }
    }

    /// A wholesale replacement of this record carrying corrected inputs.
    ///
    /// Identity and position in the ledger are kept; `profit_loss` is
    /// always recomputed from the new inputs.
    pub fn amended(&self, entry_value: Money, payout_percent: Percent, outcome: Outcome) -> Self {
        Self {
            entry_value,
            payout_percent,
            outcome,
            profit_loss: profit_loss_for(entry_value, payout_percent, outcome),
            ..self.clone()
        }
    }

    /// Profit this record's level would pay on a win.
    pub fn expected_profit(&self) -> Money {
        expected_profit(self.entry_value, self.payout_percent)
    }

    /// Whether `profit_loss` agrees with the record's own inputs.
    pub fn is_consistent(&self) -> bool {
        self.profit_loss == profit_loss_for(self.entry_value, self.payout_percent, self.outcome)
    }

    /// Replay order key.
    pub fn order_key(&self) -> (RecordedAt, &RecordId) {
        (self.recorded_at, &self.id)
    }

    /// Decode a JSON array of records, as exported by a journal backend.
    pub fn list_from_json(input: &str) -> Result<Vec<Self>, LedgerError> {
        serde_json::from_str(input).map_err(|e| LedgerError::Serialization(e.to_string()))
    }
}

/// A record augmented with the balances replay derived for it. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    #[serde(flatten)]
    pub record: OutcomeRecord,
    /// Balance immediately after this record.
    pub running_balance: Money,
    /// Baseline carried into the next round.
    pub settled_balance: Money,
}
