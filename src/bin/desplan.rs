//! `desplan` - plan a serial production line from the command line.
//!
//! Builds a [`ProductionLine`], runs the selected algorithms for every
//! requested batch size and prints batch size, planning time, makespan and
//! parallelism score per run.
//!
//! Set `RUST_LOG=u_desplan=debug` to watch the search layer by layer.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tabled::{Table, Tabled};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use u_desplan::line::ProductionLine;
use u_desplan::planner::{Algorithm, PlanOutcome, Planner, PlannerConfig};
use u_desplan::problem::EventLabel;
use u_desplan::search::EngineConfig;
use u_desplan::vns::VnsConfig;

/// Supervisory-control schedule planner.
#[derive(Debug, Parser)]
#[command(name = "desplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Algorithm to run.
    #[arg(long, value_enum, default_value = "all")]
    algorithm: AlgorithmArg,

    /// Batch sizes to plan, comma separated.
    #[arg(long, value_delimiter = ',', default_value = "1,5,10")]
    batches: Vec<usize>,

    /// Processing time of each machine, comma separated.
    #[arg(long, value_delimiter = ',', default_value = "3,2,4")]
    durations: Vec<f64>,

    /// Number of machines; the processing times are repeated to fit.
    #[arg(long)]
    machines: Option<usize>,

    /// Products searched exactly before composition.
    #[arg(long, default_value_t = 1)]
    batch_string: usize,

    /// Optimizer seed (random if omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Use the short optimizer schedule.
    #[arg(long)]
    fast: bool,

    /// Frontier size above which layers are expanded in parallel.
    #[arg(long, default_value_t = 100)]
    threshold: usize,

    /// Output format.
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlgorithmArg {
    TimeOptimal,
    Parallelism,
    Composed,
    All,
}

impl AlgorithmArg {
    fn selected(self) -> Vec<Algorithm> {
        match self {
            AlgorithmArg::TimeOptimal => vec![Algorithm::TimeOptimal],
            AlgorithmArg::Parallelism => vec![Algorithm::Parallelism],
            AlgorithmArg::Composed => vec![Algorithm::Composed],
            AlgorithmArg::All => Algorithm::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    fn line(&self) -> Result<ProductionLine> {
        let machines = self.machines.unwrap_or(self.durations.len());
        let durations: Vec<f64> =
            self.durations.iter().copied().cycle().take(machines).collect();
        ProductionLine::new(&durations).context("building the production line")
    }

    fn planner_config(&self) -> PlannerConfig {
        let mut vns = if self.fast {
            VnsConfig::fast()
        } else {
            VnsConfig::standard()
        };
        if let Some(seed) = self.seed {
            vns = vns.with_seed(seed);
        }
        PlannerConfig::default()
            .with_engine(EngineConfig::default().with_parallel_threshold(self.threshold))
            .with_vns(vns)
            .with_batch_string(self.batch_string)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let line = cli.line()?;
    let config = cli.planner_config();

    let mut outcomes = Vec::new();
    for algorithm in cli.algorithm.selected() {
        for &batch_count in &cli.batches {
            let outcome = Planner::plan(&line, algorithm, batch_count, &config)
                .with_context(|| format!("{algorithm} with {batch_count} batches"))?;
            outcomes.push(outcome);
        }
    }

    match cli.format {
        OutputFormat::Table => println!("{}", Table::new(rows(&outcomes))),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
    }
    Ok(())
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Algorithm")]
    algorithm: String,
    #[tabled(rename = "Batch")]
    batch: String,
    #[tabled(rename = "Time (ms)")]
    time: String,
    #[tabled(rename = "Makespan")]
    makespan: String,
    #[tabled(rename = "Parallelism")]
    parallelism: String,
    #[tabled(rename = "Complete")]
    complete: String,
}

fn rows(outcomes: &[PlanOutcome<EventLabel>]) -> Vec<PlanRow> {
    outcomes
        .iter()
        .map(|o| PlanRow {
            algorithm: o.algorithm.name().to_string(),
            batch: o.batch_count.to_string(),
            time: format!("{:.3}", millis(o.elapsed)),
            makespan: format!("{:.1}", o.makespan),
            parallelism: format!("{:.1}", o.parallelism),
            complete: if o.complete { "yes" } else { "no" }.to_string(),
        })
        .collect()
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}
