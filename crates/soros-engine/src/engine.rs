use std::sync::Arc;

use serde::Serialize;
use soros_ledger::{LedgerReconciler, NewOutcome, OutcomeRecord, OutcomeStore};
use soros_types::{ConfigError, LineageId, Money, Outcome, Percent, SimulationConfig};
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::ladder::LevelLadder;
use crate::level::Level;

/// Whether a round can still take outcomes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RoundState {
    /// The level with this index takes the next outcome.
    Active { level: u32 },
    /// The round is over; `reset` starts the next one.
    Ended(RoundEnd),
}

impl RoundState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RoundEnd {
    /// A loss at this level ended the round.
    Lost { level: u32 },
    /// The last level was won; there is nothing left to climb.
    Exhausted,
}

/// What `record_outcome` returns after the record has been persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedOutcome {
    pub record: OutcomeRecord,
    pub running_balance: Money,
    pub settled_balance: Money,
    pub round: RoundState,
}

/// Point-in-time view of an engine for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngineSnapshot {
    pub lineage: LineageId,
    pub config: SimulationConfig,
    pub levels: Vec<Level>,
    pub round: RoundState,
    pub balance: Money,
    pub protection_profit: Money,
}

/// Live progressive-stake state machine for one lineage.
///
/// Each instance owns its ladder; nothing is shared between instances.
/// `record_outcome` takes `&mut self`, so at most one outcome is in flight
/// per engine; wrap the engine in [`crate::SharedEngine`] to drive it from
/// several tasks.
pub struct ProgressionEngine<S> {
    store: Arc<S>,
    owner: String,
    lineage: LineageId,
    config: SimulationConfig,
    levels: Vec<Level>,
    round: RoundState,
    protection_profit: Money,
    /// Settled balance the next outcome builds on.
    balance: Money,
}

impl<S: OutcomeStore> ProgressionEngine<S> {
    /// Start a fresh lineage for `owner` under `config`.
    pub fn new(owner: impl Into<String>, config: SimulationConfig, store: Arc<S>) -> EngineResult<Self> {
        config.validate()?;
        let owner = owner.into();
        let lineage = LineageId::derive(&owner, &config);
        let levels = LevelLadder::build(&config);
        let round = RoundState::Active {
            level: config.first_level_index(),
        };
        let balance = config.starting_baseline();

        info!(lineage = %lineage, owner = %owner, "created progression engine");
        Ok(Self {
            store,
            owner,
            lineage,
            config,
            levels,
            round,
            protection_profit: Money::ZERO,
            balance,
        })
    }

    /// Reopen an existing lineage from its stored history.
    ///
    /// The balance is whatever replaying the history settles to. If the
    /// history ends partway through a round (a run of wins from the first
    /// level that has not reached the top), that round is rebuilt with the
    /// stakes and payouts it was played at and play continues from the next
    /// level. Otherwise a fresh round starts.
    pub async fn resume(
        owner: impl Into<String>,
        config: SimulationConfig,
        store: Arc<S>,
    ) -> EngineResult<Self> {
        let mut engine = Self::new(owner, config, store)?;
        let history = engine.store.list_ordered(&engine.lineage).await?;
        engine.balance = LedgerReconciler::final_balance(&engine.config, &history);
        engine.restore_round(&history);
        info!(
            lineage = %engine.lineage,
            records = history.len(),
            balance = %engine.balance,
            round = ?engine.round,
            "resumed lineage"
        );
        Ok(engine)
    }

    pub fn lineage(&self) -> &LineageId {
        &self.lineage
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, index: u32) -> Option<&Level> {
        self.levels.iter().find(|l| l.index() == index)
    }

    pub fn round_state(&self) -> RoundState {
        self.round
    }

    pub fn active_level(&self) -> Option<&Level> {
        match self.round {
            RoundState::Active { level } => self.level(level),
            RoundState::Ended(_) => None,
        }
    }

    /// Current baseline: the settled balance the next outcome builds on.
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Winnings of the protection level carried into level 1 this round.
    pub fn protection_profit(&self) -> Money {
        self.protection_profit
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            lineage: self.lineage.clone(),
            config: self.config.clone(),
            levels: self.levels.clone(),
            round: self.round,
            balance: self.balance(),
            protection_profit: self.protection_profit,
        }
    }

    /// Record the outcome of the active level.
    ///
    /// The record is appended to the store first; the ladder only moves
    /// once the store has accepted it. A store failure is returned as
    /// [`EngineError::Persistence`] and leaves the engine untouched, so the
    /// same call can be retried.
    pub async fn record_outcome(&mut self, outcome: Outcome) -> EngineResult<RecordedOutcome> {
        let position = self.active_position().ok_or(EngineError::NoActiveLevel)?;
        let level = &self.levels[position];
        let pending = NewOutcome::settle(
            level.index(),
            level.entry_value(),
            level.payout_percent(),
            outcome,
        );

        let record = match self.store.append(&self.lineage, pending).await {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    lineage = %self.lineage,
                    level = level.index(),
                    outcome = %outcome,
                    error = %err,
                    "failed to persist outcome; ladder unchanged"
                );
                return Err(err.into());
            }
        };

        let (running_balance, settled_balance) = self.settle(position, outcome);
        self.balance = settled_balance;
        self.advance(position, outcome);

        info!(
            lineage = %self.lineage,
            level = record.level,
            outcome = %outcome,
            profit_loss = %record.profit_loss,
            balance = %settled_balance,
            "recorded outcome"
        );
        Ok(RecordedOutcome {
            record,
            running_balance,
            settled_balance,
            round: self.round,
        })
    }

    /// Set the global payout and apply it to every level not yet played.
    ///
    /// Overrides individually edited payouts on pending and active levels.
    /// Completed levels keep the payout they were played at.
    pub fn set_payout(&mut self, payout: Percent) -> EngineResult<()> {
        if !payout.is_valid_payout() {
            return Err(ConfigError::PayoutOutOfRange(payout).into());
        }
        self.config.payout_percent = payout;
        for level in self.levels.iter_mut().filter(|l| !l.is_completed()) {
            level.set_payout(payout);
        }
        debug!(lineage = %self.lineage, payout = %payout, "updated payout");
        Ok(())
    }

    /// Set one level's payout, recomputing only that level's expected profit.
    pub fn set_level_payout(&mut self, index: u32, payout: Percent) -> EngineResult<()> {
        if !payout.is_valid_payout() {
            return Err(ConfigError::PayoutOutOfRange(payout).into());
        }
        self.editable_level(index)?.set_payout(payout);
        debug!(lineage = %self.lineage, level = index, payout = %payout, "updated level payout");
        Ok(())
    }

    /// Manually override one level's stake.
    ///
    /// Only that level's expected profit is recomputed; later levels keep
    /// their entry values until the next win cascades over them or the
    /// ladder is reset.
    pub fn set_level_entry_value(&mut self, index: u32, entry_value: Money) -> EngineResult<()> {
        if !entry_value.is_positive() {
            return Err(ConfigError::NonPositiveStake(entry_value).into());
        }
        self.editable_level(index)?.set_entry_value(entry_value);
        debug!(lineage = %self.lineage, level = index, entry = %entry_value, "overrode level stake");
        Ok(())
    }

    /// Rebuild the ladder from the configuration and start a new round.
    ///
    /// The lineage and its balance carry over.
    pub fn reset(&mut self) {
        self.levels = LevelLadder::build(&self.config);
        self.round = RoundState::Active {
            level: self.config.first_level_index(),
        };
        self.protection_profit = Money::ZERO;
        info!(lineage = %self.lineage, balance = %self.balance(), "reset ladder");
    }

    /// Switch to a new configuration. This starts a new lineage with a
    /// freshly seeded balance.
    pub fn reconfigure(&mut self, config: SimulationConfig) -> EngineResult<()> {
        config.validate()?;
        self.lineage = LineageId::derive(&self.owner, &config);
        self.balance = config.starting_baseline();
        self.config = config;
        self.reset();
        info!(lineage = %self.lineage, "reconfigured engine");
        Ok(())
    }

    fn active_position(&self) -> Option<usize> {
        match self.round {
            RoundState::Active { level } => self.levels.iter().position(|l| l.index() == level),
            RoundState::Ended(_) => None,
        }
    }

    fn editable_level(&mut self, index: u32) -> EngineResult<&mut Level> {
        let level = self
            .levels
            .iter_mut()
            .find(|l| l.index() == index)
            .ok_or(EngineError::LevelNotFound(index))?;
        if level.is_completed() {
            return Err(EngineError::LevelCompleted(index));
        }
        Ok(level)
    }

    /// Balances after playing the level at `position`: the running balance
    /// and the settled balance the next outcome starts from.
    ///
    /// Level 0 only ever risks the protection stake, so it always hands the
    /// protection value on. Above it a win banks the whole running balance
    /// and a loss falls back to the protection capital. Without protection,
    /// a loss can at most empty the balance.
    fn settle(&self, position: usize, outcome: Outcome) -> (Money, Money) {
        let played = &self.levels[position];
        let running = match outcome {
            Outcome::Win => self.balance + played.expected_profit(),
            Outcome::Loss => self.balance - played.entry_value(),
        };
        let settled = if self.config.use_protection {
            if played.index() == 0 || outcome == Outcome::Loss {
                self.config.protection_value
            } else {
                running
            }
        } else if outcome == Outcome::Win {
            running
        } else {
            running.max(Money::ZERO)
        };
        (running, settled)
    }

    /// Replay the trailing in-progress round of `history` onto a fresh ladder.
    fn restore_round(&mut self, history: &[OutcomeRecord]) {
        let first = self.config.first_level_index();
        let Some(start) = history.iter().rposition(|r| r.level == first) else {
            return;
        };
        let trailing = &history[start..];
        let in_progress = trailing.len() < self.levels.len()
            && trailing
                .iter()
                .zip(first..)
                .all(|(record, level)| record.outcome == Outcome::Win && record.level == level);
        if !in_progress {
            return;
        }

        for record in trailing {
            let Some(position) = self.active_position() else {
                return;
            };
            let level = &mut self.levels[position];
            level.set_payout(record.payout_percent);
            level.set_entry_value(record.entry_value);
            self.advance(position, record.outcome);
        }
    }

    /// Apply a persisted outcome to the ladder.
    fn advance(&mut self, position: usize, outcome: Outcome) {
        self.levels[position].complete(outcome);
        let played = &self.levels[position];
        let played_index = played.index();

        if outcome == Outcome::Loss {
            self.round = RoundState::Ended(RoundEnd::Lost { level: played_index });
            return;
        }

        let next = position + 1;
        if next >= self.levels.len() {
            self.round = RoundState::Ended(RoundEnd::Exhausted);
            return;
        }

        let next_entry = if self.config.use_protection && played_index == 0 {
            self.protection_profit = played.expected_profit();
            self.config.initial_value + self.protection_profit
        } else {
            played.expected_profit()
        };

        self.levels[next].set_entry_value(next_entry);
        self.levels[next].activate();
        LevelLadder::cascade(&mut self.levels, next);
        self.round = RoundState::Active {
            level: self.levels[next].index(),
        };
    }
}
