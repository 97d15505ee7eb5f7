//! Observer pattern for simulation pipelines
//!
//! Observers allow composable data collection during the dynamics without
//! coupling the driver loop to specific output formats.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::simulation::RunSummary;
use crate::{Result, dynamics::TraceEntry, ports::Observer};

/// Progress bar observer - Shows how many runs have finished
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    converged: usize,
    capped: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            converged: 0,
            capped: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} converged, {} capped", self.converged, self.capped)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_simulations_start(&mut self, total_runs: usize, _max_iterations: usize) -> Result<()> {
        let pb = ProgressBar::new(total_runs as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} runs ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_turn(&mut self, run: usize, entry: &TraceEntry) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!(
                "run {} turn {} potential {:.1}; {}",
                run + 1,
                entry.iteration,
                entry.potential,
                self.message()
            ));
        }
        Ok(())
    }

    fn on_run_end(&mut self, _run: usize, summary: &RunSummary) -> Result<()> {
        if summary.converged() {
            self.converged += 1;
        } else {
            self.capped += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_simulations_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks turns, moves and convergence
pub struct MetricsObserver {
    runs: usize,
    converged_runs: usize,
    turns: usize,
    moves: usize,
    moves_per_player: Vec<usize>,
    potential_increases: usize,
    last_potential: Option<f64>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            runs: 0,
            converged_runs: 0,
            turns: 0,
            moves: 0,
            moves_per_player: Vec::new(),
            potential_increases: 0,
            last_potential: None,
        }
    }

    /// Fraction of turns in which the player moved
    pub fn move_rate(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.moves as f64 / self.turns as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            runs: self.runs,
            converged_runs: self.converged_runs,
            turns: self.turns,
            moves: self.moves,
            move_rate: self.move_rate(),
            moves_per_player: self.moves_per_player.clone(),
            potential_increases: self.potential_increases,
        }
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of simulation metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub runs: usize,
    pub converged_runs: usize,
    pub turns: usize,
    pub moves: usize,
    pub move_rate: f64,
    /// Accepted moves per player id, summed over runs
    pub moves_per_player: Vec<usize>,
    /// Turns after which the potential went up
    pub potential_increases: usize,
}

impl Observer for MetricsObserver {
    fn on_run_start(&mut self, _run: usize, engine: &crate::dynamics::BrdEngine) -> Result<()> {
        if self.moves_per_player.len() < engine.n_players() {
            self.moves_per_player.resize(engine.n_players(), 0);
        }
        self.last_potential = None;
        Ok(())
    }

    fn on_turn(&mut self, _run: usize, entry: &TraceEntry) -> Result<()> {
        self.turns += 1;
        if entry.moved {
            self.moves += 1;
            if let Some(count) = self.moves_per_player.get_mut(entry.player.value()) {
                *count += 1;
            }
        }
        if self.last_potential.is_some_and(|last| entry.potential > last) {
            self.potential_increases += 1;
        }
        self.last_potential = Some(entry.potential);
        Ok(())
    }

    fn on_run_end(&mut self, _run: usize, summary: &RunSummary) -> Result<()> {
        self.runs += 1;
        if summary.converged() {
            self.converged_runs += 1;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TurnRecord<'a> {
    run: usize,
    #[serde(flatten)]
    entry: &'a TraceEntry,
}

/// JSONL observer - Writes one JSON object per turn
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl Observer for JsonlObserver {
    fn on_turn(&mut self, run: usize, entry: &TraceEntry) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &TurnRecord { run, entry })?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn on_simulations_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
