use std::collections::HashSet;

use serde::Serialize;
use soros_types::{RecordId, SimulationConfig};

use crate::records::OutcomeRecord;

/// Result of validating a persisted history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub record_count: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

/// A specific inconsistency found in a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Position of the record in the list as given.
    pub index: usize,
    pub record: RecordId,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// `profit_loss` disagrees with entry value, payout, and outcome.
    ProfitLossMismatch,
    /// Level index outside the ladder the configuration builds.
    LevelOutOfRange,
    NonPositiveEntry,
    PayoutOutOfRange,
    DuplicateId,
    /// Timestamp not strictly after the previous record's.
    TimestampRegression,
    /// Record belongs to a different lineage than the first record.
    MixedLineage,
}

/// Consistency checks over a lineage's records.
pub struct LedgerValidator;

impl LedgerValidator {
    /// Validate records in the order given (normally `list_ordered` order).
    pub fn validate(config: &SimulationConfig, records: &[OutcomeRecord]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();
        let first_level = config.first_level_index();
        let last_level = config.last_level_index();
        let lineage = records.first().map(|r| &r.lineage);

        for (index, record) in records.iter().enumerate() {
            let mut flag = |kind: ViolationKind, description: String| {
                violations.push(Violation {
                    index,
                    record: record.id.clone(),
                    kind,
                    description,
                });
            };

            if !record.is_consistent() {
                flag(
                    ViolationKind::ProfitLossMismatch,
                    format!(
                        "{} at {} staking {} should settle {}, recorded {}",
                        record.outcome,
                        record.payout_percent,
                        record.entry_value,
                        crate::records::profit_loss_for(
                            record.entry_value,
                            record.payout_percent,
                            record.outcome
                        ),
                        record.profit_loss
                    ),
                );
            }

            if record.level < first_level || record.level > last_level {
                flag(
                    ViolationKind::LevelOutOfRange,
                    format!(
                        "level {} outside ladder {first_level}..={last_level}",
                        record.level
                    ),
                );
            }

            if !record.entry_value.is_positive() {
                flag(
                    ViolationKind::NonPositiveEntry,
                    format!("entry value {} is not positive", record.entry_value),
                );
            }

            if !record.payout_percent.is_valid_payout() {
                flag(
                    ViolationKind::PayoutOutOfRange,
                    format!("payout {} outside (0, 100]", record.payout_percent),
                );
            }

            if !seen_ids.insert(record.id.clone()) {
                flag(ViolationKind::DuplicateId, format!("id {} repeats", record.id));
            }

            if index > 0 && record.recorded_at <= records[index - 1].recorded_at {
                flag(
                    ViolationKind::TimestampRegression,
                    format!(
                        "recorded at {} after predecessor at {}",
                        record.recorded_at,
                        records[index - 1].recorded_at
                    ),
                );
            }

            if lineage.is_some_and(|l| l != &record.lineage) {
                flag(
                    ViolationKind::MixedLineage,
                    format!("lineage {} differs from ledger lineage", record.lineage),
                );
            }
        }

        ValidationReport {
            record_count: records.len(),
            violations,
        }
    }
}
