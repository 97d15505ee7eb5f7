//! Best-response dynamics for the facility location game
//!
//! - [`market`]: nearest-facility partition of the network
//! - [`engine`]: player state, utilities, best responses and the potential
//! - [`snapshot`]: per-turn trace records

pub mod engine;
pub mod market;
pub mod snapshot;

pub use engine::BrdEngine;
pub use market::{MarketPartition, MarketPartitioner};
pub use snapshot::TraceEntry;
