//! Run command - Drive best-response dynamics to equilibrium

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{print_players, print_section, print_stats_table, print_subsection},
    export::{SummaryFormat, TraceCsvExporter, save_report},
    pipeline::{
        BatchSummary, JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver,
        RunSummary, Simulation, SimulationReport,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Run best-response dynamics until a Nash equilibrium")]
pub struct RunArgs {
    /// Configuration file (JSON); defaults are used when it does not exist
    #[arg(long, short = 'c', default_value = "config.json")]
    pub config: PathBuf,

    /// Override the base random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of independent simulations
    #[arg(long, short = 'n')]
    pub simulations: Option<usize>,

    /// Override the iteration cap per run
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Override the number of players
    #[arg(long)]
    pub players: Option<usize>,

    /// Write the full report (summary and traces) to this file
    #[arg(long, short = 'o')]
    pub summary: Option<PathBuf>,

    /// Report encoding (json or msgpack); guessed from the extension if omitted
    #[arg(long)]
    pub format: Option<SummaryFormat>,

    /// Write per-turn traces as CSV
    #[arg(long)]
    pub trace_csv: Option<PathBuf>,

    /// Write every turn as a JSON line
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let mut config = super::load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(simulations) = args.simulations {
        config.n_simulations = simulations;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(players) = args.players {
        config.n_brd_players = players;
    }

    let mut simulation = Simulation::new(config).context("invalid simulation configuration")?;
    if !args.no_progress {
        simulation = simulation.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        simulation = simulation.with_observer(Box::new(observer));
    }

    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    simulation = simulation.with_observer(Box::new(Arc::clone(&metrics)));

    let report = simulation.run()?;
    match &report {
        SimulationReport::Single(summary) => show_single(summary),
        SimulationReport::Batch(batch) => show_batch(batch),
    }
    if let Ok(metrics) = metrics.lock() {
        show_metrics(&metrics.summary());
    }

    if let Some(path) = &args.trace_csv {
        let runs: Vec<&RunSummary> = match &report {
            SimulationReport::Single(summary) => vec![summary],
            SimulationReport::Batch(batch) => batch.runs.iter().collect(),
        };
        TraceCsvExporter::export(path, runs)?;
        println!("\nTrace written to: {}", path.display());
    }

    if let Some(path) = &args.summary {
        let format = args
            .format
            .unwrap_or_else(|| SummaryFormat::from_path(path));
        save_report(&report, path, format)?;
        println!("Report written to: {} ({format})", path.display());
    }

    Ok(())
}

fn show_single(summary: &RunSummary) {
    print_section("Simulation Results");
    print_stats_table(&[
        ("Seed", summary.seed.to_string()),
        ("Outcome", summary.outcome.to_string()),
        ("Iterations", summary.iterations.to_string()),
        ("Moves", summary.moves.to_string()),
        (
            "Final potential",
            summary
                .final_potential()
                .map_or_else(|| "n/a".to_string(), |p| format!("{p:.2}")),
        ),
    ]);

    print_subsection("Final players' positions");
    print_players(summary.final_players());
}

fn show_batch(batch: &BatchSummary) {
    let stats = &batch.statistics;
    print_section("Batch Results");
    print_stats_table(&[
        ("Runs", stats.runs.to_string()),
        (
            "Converged",
            format!(
                "{} ({:.1}%)",
                stats.converged_runs,
                stats.convergence_rate() * 100.0
            ),
        ),
        (
            "Iterations",
            format!(
                "mean {:.2}, std {:.2}, min {}, max {}",
                stats.mean_iterations,
                stats.std_iterations,
                stats.min_iterations,
                stats.max_iterations
            ),
        ),
        ("Mean moves", format!("{:.2}", stats.mean_moves)),
        (
            "Final potential",
            format!(
                "mean {:.2}, std {:.2}",
                stats.mean_final_potential, stats.std_final_potential
            ),
        ),
    ]);

    print_subsection("Per run");
    for summary in &batch.runs {
        println!(
            "  run {:>3} seed {:>6}: {:<24} {:>6} iterations, potential {:.2}",
            summary.run,
            summary.seed,
            summary.outcome.to_string(),
            summary.iterations,
            summary.final_potential().unwrap_or(f64::NAN)
        );
    }
}

fn show_metrics(metrics: &MetricsSummary) {
    print_subsection("Dynamics");
    print_stats_table(&[
        ("Turns", metrics.turns.to_string()),
        (
            "Accepted moves",
            format!("{} ({:.1}% of turns)", metrics.moves, metrics.move_rate * 100.0),
        ),
        ("Potential increases", metrics.potential_increases.to_string()),
    ]);
    for (player, moves) in metrics.moves_per_player.iter().enumerate() {
        println!("  player {player:>4}: {moves} moves");
    }
}
