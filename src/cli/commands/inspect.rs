//! Inspect command - Show the environment a run would play on

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_nodes, print_kv, print_section, print_subsection},
    distance::DistanceMatrix,
    environment::GraphEnvironment,
};

#[derive(Parser, Debug)]
#[command(about = "Generate and describe the environment of a run")]
pub struct InspectArgs {
    /// Configuration file (JSON); defaults are used when it does not exist
    #[arg(long, short = 'c', default_value = "config.json")]
    pub config: PathBuf,

    /// Run index whose environment is generated (seed = base seed + run)
    #[arg(long, default_value_t = 0)]
    pub run: usize,

    /// Dump the environment as JSON to this file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print every edge
    #[arg(long, default_value_t = false)]
    pub edges: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    config.validate().context("invalid simulation configuration")?;

    let seed = config.run_seed(args.run);
    let environment = GraphEnvironment::generate(&config.environment_config(seed))?;
    let distances = DistanceMatrix::compute(&environment);

    let diameter = (0..environment.n_nodes())
        .flat_map(|u| distances.row(u).iter().copied())
        .fold(0.0, f64::max);
    let total_cost: u64 = environment
        .edges()
        .iter()
        .map(|e| u64::from(e.weight))
        .sum();

    print_section(&format!("Environment (run {}, seed {seed})", args.run));
    print_kv("Nodes", &environment.n_nodes().to_string());
    print_kv("Edges", &environment.edges().len().to_string());
    print_kv("Total edge cost", &total_cost.to_string());
    print_kv("Diameter", &format!("{diameter:.0}"));
    print_kv("Total demand", &environment.total_demand().to_string());
    print_kv("Demand distribution", &config.demand_distribution.to_string());
    print_kv("Cost distribution", &config.cost_distribution.to_string());
    print_kv(
        "Candidate facilities",
        &format!(
            "{} [{}]",
            environment.n_candidates(),
            format_nodes(environment.candidates())
        ),
    );
    print_kv("Players", &config.n_brd_players.to_string());

    if args.edges {
        print_subsection("Edges");
        for edge in environment.edges() {
            println!(
                "  {:>5} - {:<5} cost {:>4}   demand {:>4} / {:>4}",
                edge.a,
                edge.b,
                edge.weight,
                environment.demand_of(edge.a),
                environment.demand_of(edge.b)
            );
        }
    }

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &environment)?;
        println!("\nEnvironment written to: {}", path.display());
    }

    Ok(())
}
