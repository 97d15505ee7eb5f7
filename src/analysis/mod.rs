//! Aggregate statistics over batches of runs

pub mod stats;

pub use stats::BatchStatistics;
