//! Facility location games on random trees
//!
//! This crate provides:
//! - Random weighted tree environments with node demand and candidate facilities
//! - All-pairs shortest-path distances
//! - Sequential best-response dynamics with randomized market tie-breaking
//! - A simulation driver that runs the dynamics to a Nash equilibrium
//! - Observers, batch statistics and trace export

pub mod analysis;
pub mod cli;
pub mod distance;
pub mod dynamics;
pub mod environment;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod ports;
pub mod types;

pub use distance::DistanceMatrix;
pub use dynamics::{BrdEngine, MarketPartition, MarketPartitioner, TraceEntry};
pub use environment::{DistributionSpec, EnvironmentConfig, GraphEnvironment};
pub use error::{Error, Result};
pub use pipeline::{
    BatchSummary, RunOutcome, RunSummary, Simulation, SimulationConfig, SimulationReport,
};
pub use types::{NodeId, PlayerId, PlayerState};
