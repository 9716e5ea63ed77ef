use serde::Serialize;
use soros_types::{expected_profit, Money, Outcome, Percent};

/// Lifecycle of a level within one round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "outcome")]
pub enum LevelStatus {
    Pending,
    Active,
    Completed(Outcome),
}

/// One rung of the stake ladder.
///
/// `expected_profit` is always `round2(entry_value × payout_percent / 100)`
/// for the level's own payout; the setters recompute it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Level {
    index: u32,
    entry_value: Money,
    payout_percent: Percent,
    expected_profit: Money,
    status: LevelStatus,
}

impl Level {
    pub fn new(index: u32, entry_value: Money, payout_percent: Percent) -> Self {
        Self {
            index,
            entry_value,
            payout_percent,
            expected_profit: expected_profit(entry_value, payout_percent),
            status: LevelStatus::Pending,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn entry_value(&self) -> Money {
        self.entry_value
    }

    pub fn payout_percent(&self) -> Percent {
        self.payout_percent
    }

    pub fn expected_profit(&self) -> Money {
        self.expected_profit
    }

    pub fn status(&self) -> LevelStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == LevelStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, LevelStatus::Completed(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.status {
            LevelStatus::Completed(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub(crate) fn set_entry_value(&mut self, entry_value: Money) {
        self.entry_value = entry_value;
        self.expected_profit = expected_profit(self.entry_value, self.payout_percent);
    }

    pub(crate) fn set_payout(&mut self, payout_percent: Percent) {
        self.payout_percent = payout_percent;
        self.expected_profit = expected_profit(self.entry_value, self.payout_percent);
    }

    pub(crate) fn activate(&mut self) {
        self.status = LevelStatus::Active;
    }

    pub(crate) fn complete(&mut self, outcome: Outcome) {
        self.status = LevelStatus::Completed(outcome);
    }
}
