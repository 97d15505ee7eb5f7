//! Per-turn trace records.

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, PlayerState};

/// State of the game right after one best-response turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// 1-based turn number
    pub iteration: usize,
    /// Player that took the turn
    pub player: PlayerId,
    /// Whether the player switched facility
    pub moved: bool,
    /// Potential function after the turn
    pub potential: f64,
    /// Facility and utility of every player, by player id
    pub players: Vec<PlayerState>,
}

impl TraceEntry {
    pub fn state_of(&self, player: PlayerId) -> Option<&PlayerState> {
        self.players.get(player.value())
    }
}
