use soros_types::{Money, SimulationConfig};
use tracing::debug;

use crate::level::Level;

/// How the entry value of the next level follows from the previous one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainRule {
    /// Only the previous level's winnings are staked forward.
    StakeWinnings,
    /// Stake and winnings are both reinvested.
    Reinvest,
}

impl ChainRule {
    pub fn next_entry(self, previous: &Level) -> Money {
        match self {
            Self::StakeWinnings => previous.expected_profit(),
            Self::Reinvest => previous.entry_value() + previous.expected_profit(),
        }
    }

    /// Rule used to build a fresh ladder for the configuration's mode.
    pub fn for_config(config: &SimulationConfig) -> Self {
        if config.use_protection {
            Self::StakeWinnings
        } else {
            Self::Reinvest
        }
    }
}

/// Builds and re-chains stake ladders.
pub struct LevelLadder;

impl LevelLadder {
    /// Build the ladder for a configuration.
    ///
    /// With protection: level 0 stakes `protection_value`, then levels
    /// `1..=protected_forward_levels` each stake the previous level's
    /// expected profit. Without protection: level 1 stakes
    /// `initial_value`, then up to `unprotected_levels` levels each
    /// reinvest stake plus profit. The first level is active; the rest
    /// are pending.
    ///
    /// Stakes are not floored. Once an expected profit rounds to 0.00,
    /// every winnings-only level after it stakes 0.00; playing such a level
    /// produces a record `LedgerValidator` reports as `NonPositiveEntry`.
    pub fn build(config: &SimulationConfig) -> Vec<Level> {
        let first_index = config.first_level_index();
        let last_index = config.last_level_index();
        let rule = ChainRule::for_config(config);
        let payout = config.payout_percent;

        let mut levels = Vec::with_capacity((last_index - first_index + 1) as usize);
        let mut first = Level::new(first_index, config.starting_baseline(), payout);
        first.activate();
        levels.push(first);

        for index in (first_index + 1)..=last_index {
            let entry = match levels.last() {
                Some(previous) => rule.next_entry(previous),
                None => config.starting_baseline(),
            };
            levels.push(Level::new(index, entry, payout));
        }

        debug!(
            protection = config.use_protection,
            levels = levels.len(),
            first_entry = %config.starting_baseline(),
            "built ladder"
        );
        levels
    }

    /// Re-chain every level after `position` with the reinvest rule.
    ///
    /// Each level keeps its own payout; only entry values and expected
    /// profits change.
    pub fn cascade(levels: &mut [Level], position: usize) {
        for next in (position + 1)..levels.len() {
            let entry = ChainRule::Reinvest.next_entry(&levels[next - 1]);
            levels[next].set_entry_value(entry);
        }
        debug!(from = position, levels = levels.len(), "cascaded ladder");
    }
}

#[cfg(test)]
mod tests {
    use soros_types::Percent;

    use super::*;
    use crate::level::LevelStatus;

    fn protected(payout: u32) -> SimulationConfig {
        SimulationConfig {
            initial_value: Money::from_units(10),
            payout_percent: Percent::from_whole(payout),
            use_protection: true,
            protection_value: Money::from_units(10),
            ..Default::default()
        }
    }

    fn entries(levels: &[Level]) -> Vec<i64> {
        levels.iter().map(|l| l.entry_value().cents()).collect()
    }

    #[test]
    fn protected_ladder_shape() {
        let levels = LevelLadder::build(&protected(80));
        assert_eq!(levels.len(), 6);
        assert_eq!(levels[0].index(), 0);
        assert_eq!(levels[0].entry_value(), Money::from_units(10));
        assert_eq!(levels[0].expected_profit(), Money::from_cents(800));
        assert_eq!(levels[1].entry_value(), Money::from_cents(800));
        assert_eq!(levels[1].expected_profit(), Money::from_cents(640));
        assert_eq!(entries(&levels), vec![1000, 800, 640, 512, 410, 328]);
    }

    #[test]
    fn unprotected_ladder_reinvests() {
        let config = SimulationConfig::default();
        let levels = LevelLadder::build(&config);
        assert_eq!(levels.len(), 6);
        assert_eq!(levels[0].index(), 1);
        assert_eq!(levels[5].index(), 6);
        // 10 -> 18 -> 32.40 -> 58.32 -> 104.98 -> 188.96
        assert_eq!(entries(&levels), vec![1000, 1800, 3240, 5832, 10498, 18896]);
    }

    #[test]
    fn only_first_level_is_active() {
        for config in [protected(80), SimulationConfig::default()] {
            let levels = LevelLadder::build(&config);
            assert_eq!(levels[0].status(), LevelStatus::Active);
            assert!(levels[1..].iter().all(|l| l.status() == LevelStatus::Pending));
        }
    }

    #[test]
    fn every_level_satisfies_profit_rounding() {
        let levels = LevelLadder::build(&protected(73));
        for level in &levels {
            assert_eq!(
                level.expected_profit(),
                soros_types::expected_profit(level.entry_value(), level.payout_percent())
            );
        }
    }

    #[test]
    fn winnings_that_round_to_zero_leave_zero_stakes() {
        let levels = LevelLadder::build(&protected(1));
        // 10 at 1% pays 0.10, and 0.10 at 1% rounds to nothing.
        assert_eq!(entries(&levels), vec![1000, 10, 0, 0, 0, 0]);
        assert!(levels[2..].iter().all(|l| l.expected_profit() == Money::ZERO));
    }

    #[test]
    fn ladder_shape_is_configurable() {
        let mut config = protected(80);
        config.ladder.protected_forward_levels = 2;
        assert_eq!(LevelLadder::build(&config).len(), 3);

        let mut config = SimulationConfig::default();
        config.ladder.unprotected_levels = 0;
        assert_eq!(LevelLadder::build(&config).len(), 1);
    }

    #[test]
    fn cascade_uses_each_levels_own_payout() {
        let mut levels = LevelLadder::build(&SimulationConfig::default());
        levels[2].set_payout(Percent::from_whole(50));
        levels[0].set_entry_value(Money::from_units(20));
        LevelLadder::cascade(&mut levels, 0);

        // 20 -> 36 (20 + 16) -> 64.80; level 3 at 50% pays 32.40 -> 97.20
        assert_eq!(levels[1].entry_value(), Money::from_units(36));
        assert_eq!(levels[2].entry_value(), Money::from_cents(6480));
        assert_eq!(levels[2].expected_profit(), Money::from_cents(3240));
        assert_eq!(levels[3].entry_value(), Money::from_cents(9720));
        assert_eq!(levels[2].payout_percent(), Percent::from_whole(50));
    }
}
