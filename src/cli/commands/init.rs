//! Init command - Write a configuration file with the default parameters

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use crate::pipeline::SimulationConfig;

#[derive(Parser, Debug)]
#[command(about = "Write a default configuration file")]
pub struct InitArgs {
    /// Where to write the configuration
    #[arg(default_value = "config.json")]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

pub fn execute(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }
    SimulationConfig::default().save(&args.path)?;
    println!("Configuration written to: {}", args.path.display());
    Ok(())
}
