use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use soros_engine::{EngineSnapshot, Level, LevelLadder, ProgressionEngine};
use soros_ledger::{
    InMemoryOutcomeStore, JournalProjection, JournalSummary, LedgerReconciler, LedgerValidator,
    OutcomeRecord, ReconciledRecord, ValidationReport,
};
use soros_types::{LineageId, Money, Outcome, SimulationConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Ladder(args) => cmd_ladder(config, args, cli.json),
        Command::Simulate(args) => cmd_simulate(config, args, cli.json),
        Command::Replay(args) => cmd_replay(config, args, cli.json),
        Command::Validate(args) => cmd_validate(config, args, cli.json),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SimulationConfig> {
    let config = match path {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_records(path: &Path) -> anyhow::Result<Vec<OutcomeRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading records from {}", path.display()))?;
    Ok(OutcomeRecord::list_from_json(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_ladder(mut config: SimulationConfig, args: LadderArgs, json: bool) -> anyhow::Result<()> {
    if let Some(payout) = args.payout {
        config.payout_percent = payout;
        config.validate()?;
    }
    let levels = LevelLadder::build(&config);
    if json {
        return print_json(&levels);
    }

    let mode = if config.use_protection {
        format!("protection {}", config.protection_value)
    } else {
        "no protection".to_string()
    };
    println!(
        "Ladder from {} at {} ({})",
        config.initial_value.to_string().bold(),
        config.payout_percent.to_string().cyan(),
        mode
    );
    for level in &levels {
        print_level(level, config.use_protection);
    }
    Ok(())
}

fn print_level(level: &Level, protected: bool) {
    let label = if protected && level.index() == 0 {
        "P".to_string()
    } else {
        level.index().to_string()
    };
    println!(
        "  {:>2}  entry {:>12}  payout {:>8}  profit {}",
        label.yellow(),
        level.entry_value().to_string(),
        level.payout_percent().to_string(),
        level.expected_profit().to_string().green()
    );
}

/// Everything a simulation run produced.
#[derive(Debug, Serialize)]
pub struct SimulationRun {
    pub lineage: LineageId,
    pub rounds: usize,
    pub trail: Vec<ReconciledRecord>,
    pub summary: JournalSummary,
    pub engine: EngineSnapshot,
}

/// Play `outcomes` through a live engine, starting a new round whenever one
/// ends, then reconcile what was persisted.
pub async fn run_simulation(
    config: SimulationConfig,
    owner: &str,
    outcomes: &[Outcome],
) -> anyhow::Result<SimulationRun> {
    let store = Arc::new(InMemoryOutcomeStore::new());
    let mut engine = ProgressionEngine::new(owner, config.clone(), Arc::clone(&store))?;
    let mut rounds = 1;

    for &outcome in outcomes {
        if !engine.round_state().is_active() {
            engine.reset();
            rounds += 1;
        }
        engine.record_outcome(outcome).await?;
    }

    let lineage = engine.lineage().clone();
    let trail = LedgerReconciler::reconcile_stored(store.as_ref(), &lineage, &config).await?;
    let summary = JournalProjection::summarize(config.starting_baseline(), &trail);
    anyhow::ensure!(
        summary.final_balance == engine.balance(),
        "replayed balance {} disagrees with live balance {}",
        summary.final_balance,
        engine.balance()
    );

    Ok(SimulationRun {
        lineage,
        rounds,
        trail,
        summary,
        engine: engine.snapshot(),
    })
}

fn simulated_outcomes(args: &SimulateArgs) -> anyhow::Result<Vec<Outcome>> {
    if let Some(sequence) = &args.outcomes {
        return Ok(Outcome::parse_sequence(sequence)?);
    }
    let count = args.random.unwrap_or_default();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok((0..count)
        .map(|_| if rng.gen_bool(0.5) { Outcome::Win } else { Outcome::Loss })
        .collect())
}

fn cmd_simulate(config: SimulationConfig, args: SimulateArgs, json: bool) -> anyhow::Result<()> {
    let outcomes = simulated_outcomes(&args)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let run = runtime.block_on(run_simulation(config, &args.owner, &outcomes))?;

    if json {
        return print_json(&run);
    }
    println!(
        "Lineage {} ({} rounds)",
        run.lineage.to_string().cyan(),
        run.rounds.to_string().bold()
    );
    print_trail(&run.trail);
    print_summary(&run.summary);
    Ok(())
}

fn cmd_replay(config: SimulationConfig, args: RecordsArgs, json: bool) -> anyhow::Result<()> {
    let records = read_records(&args.records)?;
    let trail = LedgerReconciler::reconcile(&config, &records);
    let summary = JournalProjection::summarize(config.starting_baseline(), &trail);

    if json {
        #[derive(Serialize)]
        struct Replay<'a> {
            trail: &'a [ReconciledRecord],
            summary: &'a JournalSummary,
        }
        return print_json(&Replay {
            trail: &trail,
            summary: &summary,
        });
    }
    print_trail(&trail);
    print_summary(&summary);
    Ok(())
}

fn cmd_validate(config: SimulationConfig, args: RecordsArgs, json: bool) -> anyhow::Result<()> {
    let records = read_records(&args.records)?;
    let report = LedgerValidator::validate(&config, &records);

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    anyhow::ensure!(
        report.is_valid(),
        "{} violation(s) in {} record(s)",
        report.violations.len(),
        report.record_count
    );
    Ok(())
}

fn print_trail(trail: &[ReconciledRecord]) {
    if trail.is_empty() {
        println!("No outcomes recorded.");
        return;
    }
    for (n, entry) in trail.iter().enumerate() {
        let record = &entry.record;
        let outcome = match record.outcome {
            Outcome::Win => "win ".green(),
            Outcome::Loss => "loss".red(),
        };
        println!(
            "{:>4}  L{:<2} {}  entry {:>10}  @ {:>7}  p/l {:>10}  running {:>10}  settled {}",
            (n + 1).to_string().dimmed(),
            record.level,
            outcome,
            record.entry_value.to_string(),
            record.payout_percent.to_string(),
            signed(record.profit_loss),
            entry.running_balance.to_string(),
            entry.settled_balance.to_string().bold()
        );
    }
}

fn signed(amount: Money) -> String {
    if amount.is_negative() {
        amount.to_string()
    } else {
        format!("+{amount}")
    }
}

fn print_summary(summary: &JournalSummary) {
    println!();
    println!(
        "{} wins, {} losses ({}.{:02}% win rate)",
        summary.wins.to_string().green(),
        summary.losses.to_string().red(),
        summary.win_rate_bp / 100,
        summary.win_rate_bp % 100
    );
    println!("  Net P/L:      {}", signed(summary.net_profit_loss).bold());
    println!("  Balance:      {}", summary.final_balance.to_string().bold());
    println!("  Peak:         {}", summary.peak_balance);
    println!("  Max drawdown: {}", summary.max_drawdown);
    println!("  Win streak:   {}", summary.longest_win_streak);
}

fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        println!(
            "{} {} record(s), no issues",
            "✓".green().bold(),
            report.record_count
        );
        return;
    }
    for violation in &report.violations {
        println!(
            "{} #{} {} {:?}: {}",
            "✗".red().bold(),
            violation.index,
            violation.record.short_id().dimmed(),
            violation.kind,
            violation.description
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use soros_engine::RoundState;
    use soros_ledger::ViolationKind;
    use soros_types::Percent;

    use super::*;

    fn protected() -> SimulationConfig {
        SimulationConfig {
            use_protection: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn simulation_restarts_rounds_and_reconciles() {
        use Outcome::*;
        let run = run_simulation(protected(), "cli", &[Win, Win, Loss, Win])
            .await
            .unwrap();

        assert_eq!(run.rounds, 2);
        assert_eq!(run.trail.len(), 4);
        assert_eq!(run.summary.wins, 3);
        assert_eq!(run.engine.round, RoundState::Active { level: 1 });
        assert_eq!(run.summary.final_balance, run.engine.balance);
        assert_eq!(run.lineage, LineageId::derive("cli", &protected()));
    }

    #[tokio::test]
    async fn empty_simulation_reports_starting_baseline() {
        let run = run_simulation(SimulationConfig::default(), "cli", &[])
            .await
            .unwrap();
        assert_eq!(run.rounds, 1);
        assert!(run.trail.is_empty());
        assert_eq!(run.summary.final_balance, Money::from_units(10));
    }

    #[test]
    fn seeded_random_outcomes_are_reproducible() {
        let args = |seed| SimulateArgs {
            outcomes: None,
            random: Some(32),
            seed: Some(seed),
            owner: "cli".into(),
        };
        let first = simulated_outcomes(&args(7)).unwrap();
        assert_eq!(first.len(), 32);
        assert_eq!(first, simulated_outcomes(&args(7)).unwrap());
    }

    #[test]
    fn config_file_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initial_value = \"25.00\"\npayout_percent = \"90\"").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.initial_value, Money::from_units(25));
        assert_eq!(config.payout_percent, Percent::from_whole(90));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "initial_value = \"0\"").unwrap();
        assert!(load_config(Some(bad.path())).is_err());
        assert!(load_config(None).is_ok());
    }

    #[tokio::test]
    async fn exported_records_round_trip_through_replay_and_validation() {
        use Outcome::*;
        let config = protected();
        let run = run_simulation(config.clone(), "cli", &[Win, Win, Win, Loss])
            .await
            .unwrap();
        let records: Vec<OutcomeRecord> = run.trail.iter().map(|r| r.record.clone()).collect();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();
        let loaded = read_records(file.path()).unwrap();
        assert_eq!(loaded, records);
        assert_eq!(
            LedgerReconciler::final_balance(&config, &loaded),
            run.summary.final_balance
        );
        assert!(LedgerValidator::validate(&config, &loaded).is_valid());

        let mut tampered = loaded.clone();
        tampered[1].profit_loss = Money::from_units(99);
        let report = LedgerValidator::validate(&config, &tampered);
        assert_eq!(report.count(ViolationKind::ProfitLossMismatch), 1);
    }
}
