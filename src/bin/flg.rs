//! FLG CLI - Facility location games solved with best-response dynamics
//!
//! This CLI provides:
//! - Single and batch simulations to a Nash equilibrium
//! - Inspection of generated environments
//! - A starter configuration file

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flg")]
#[command(version, about = "Facility location games on random trees", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run best-response dynamics until equilibrium
    Run(flg::cli::commands::run::RunArgs),

    /// Generate and describe an environment
    Inspect(flg::cli::commands::inspect::InspectArgs),

    /// Write a default configuration file
    Init(flg::cli::commands::init::InitArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Run(args) => flg::cli::commands::run::execute(args),
        Commands::Inspect(args) => flg::cli::commands::inspect::execute(args),
        Commands::Init(args) => flg::cli::commands::init::execute(args),
    }
}
