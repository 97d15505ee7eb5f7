//! Newtype wrappers and small value types shared across the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a node in the network (`0..n_nodes`).
///
/// Facilities live on nodes, so facility identifiers are node identifiers too.
pub type NodeId = usize;

/// Identifier of a facility-operating player (`0..n_players`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(usize);

impl PlayerId {
    pub const fn new(value: usize) -> Self {
        PlayerId(value)
    }

    /// Get the inner value.
    pub const fn value(&self) -> usize {
        self.0
    }
}

impl From<usize> for PlayerId {
    fn from(value: usize) -> Self {
        PlayerId(value)
    }
}

impl From<PlayerId> for usize {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Facility held by a player together with its cached utility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub facility: NodeId,
    pub utility: f64,
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "facility {} (utility {:.2})", self.facility, self.utility)
    }
}
