//! Summary statistics across independent runs

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::pipeline::RunSummary;

/// Iteration and potential statistics for a batch of runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub runs: usize,
    pub converged_runs: usize,
    pub mean_iterations: f64,
    pub std_iterations: f64,
    pub min_iterations: usize,
    pub max_iterations: usize,
    pub mean_moves: f64,
    pub mean_final_potential: f64,
    pub std_final_potential: f64,
}

impl BatchStatistics {
    pub fn from_runs(runs: &[RunSummary]) -> Self {
        if runs.is_empty() {
            return Self::default();
        }

        let iterations: Vec<f64> = runs.iter().map(|r| r.iterations as f64).collect();
        let moves: Vec<f64> = runs.iter().map(|r| r.moves as f64).collect();
        let potentials: Vec<f64> = runs.iter().filter_map(RunSummary::final_potential).collect();

        Self {
            runs: runs.len(),
            converged_runs: runs.iter().filter(|r| r.converged()).count(),
            mean_iterations: iterations.iter().mean(),
            std_iterations: sample_std_dev(&iterations),
            min_iterations: runs.iter().map(|r| r.iterations).min().unwrap_or(0),
            max_iterations: runs.iter().map(|r| r.iterations).max().unwrap_or(0),
            mean_moves: moves.iter().mean(),
            mean_final_potential: if potentials.is_empty() {
                0.0
            } else {
                potentials.iter().mean()
            },
            std_final_potential: sample_std_dev(&potentials),
        }
    }

    /// Fraction of runs that reached a Nash equilibrium.
    pub fn convergence_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            self.converged_runs as f64 / self.runs as f64
        }
    }
}

// statrs returns NaN below two samples
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    }
}
