//! Subcommands of the `flg` binary

pub mod init;
pub mod inspect;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::SimulationConfig;

/// Load `path` strictly when it exists, otherwise fall back to the defaults.
pub(crate) fn load_config(path: &Path) -> Result<SimulationConfig> {
    if path.exists() {
        SimulationConfig::load(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))
    } else {
        Ok(SimulationConfig::load_or_default(path))
    }
}
