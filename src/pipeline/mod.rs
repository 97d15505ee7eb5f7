//! Simulation pipeline
//!
//! This module provides:
//! - The driver that runs best-response dynamics to equilibrium
//! - Observers that record or display what happens on every turn

pub mod observers;
pub mod simulation;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use simulation::{
    BatchSummary, RunOutcome, RunSummary, Simulation, SimulationConfig, SimulationReport,
};

pub use crate::ports::Observer;
