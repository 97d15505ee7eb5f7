//! Best-response dynamics engine
//!
//! Owns the assignment state of a single game: which facility each player
//! operates, the cached utility of each player, and the occupancy of every
//! candidate facility. State only changes through [`BrdEngine::best_response`].
//!
//! All randomness comes from one seeded stream per engine, consumed in a fixed
//! order: initial placement of players (in player-id order), then the tie-breaks
//! of every market partition in the order partitions are requested.

use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::market::{MarketPartition, MarketPartitioner};
use crate::{
    Error, Result,
    distance::DistanceMatrix,
    environment::GraphEnvironment,
    types::{NodeId, PlayerId, PlayerState},
};

#[derive(Debug, Clone)]
pub struct BrdEngine {
    environment: Arc<GraphEnvironment>,
    distances: Arc<DistanceMatrix>,
    facility_of: Vec<NodeId>,
    utility_of: Vec<f64>,
    /// Indexed by node; only candidate nodes are ever `Some`
    occupant: Vec<Option<PlayerId>>,
    rng: StdRng,
}

impl BrdEngine {
    /// Place `n_players` players on distinct random candidate facilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyPlayers`] if there are fewer candidate facilities
    /// than players, and [`Error::Configuration`] for zero players or a distance
    /// matrix that does not match the environment.
    pub fn new(
        environment: Arc<GraphEnvironment>,
        distances: Arc<DistanceMatrix>,
        n_players: usize,
        seed: u64,
    ) -> Result<Self> {
        if n_players == 0 {
            return Err(Error::configuration("the game needs at least one player"));
        }
        if n_players > environment.n_candidates() {
            return Err(Error::TooManyPlayers {
                players: n_players,
                facilities: environment.n_candidates(),
            });
        }
        if distances.n_nodes() != environment.n_nodes() {
            return Err(Error::configuration(format!(
                "distance matrix covers {} nodes but the graph has {}",
                distances.n_nodes(),
                environment.n_nodes()
            )));
        }

        let mut engine = Self {
            occupant: vec![None; environment.n_nodes()],
            facility_of: Vec::with_capacity(n_players),
            utility_of: Vec::with_capacity(n_players),
            environment,
            distances,
            rng: StdRng::seed_from_u64(seed),
        };

        for player in 0..n_players {
            let free = engine.free_facilities();
            let facility = free[engine.rng.random_range(0..free.len())];
            engine.occupant[facility] = Some(PlayerId::new(player));
            engine.facility_of.push(facility);
        }

        let partition = engine.partition();
        engine.utility_of = engine
            .facility_of
            .iter()
            .map(|&facility| engine.utility(facility, &partition))
            .collect();

        Ok(engine)
    }

    pub fn environment(&self) -> &GraphEnvironment {
        &self.environment
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn n_players(&self) -> usize {
        self.facility_of.len()
    }

    pub fn players(&self) -> impl Iterator<Item = PlayerId> + use<> {
        (0..self.facility_of.len()).map(PlayerId::new)
    }

    pub fn facility_of(&self, player: PlayerId) -> Result<NodeId> {
        Ok(self.facility_of[self.check_player(player)?])
    }

    /// Utility cached at the player's last accepted move (or at initialization).
    pub fn utility_of(&self, player: PlayerId) -> Result<f64> {
        Ok(self.utility_of[self.check_player(player)?])
    }

    pub fn is_occupied(&self, facility: NodeId) -> bool {
        self.occupant(facility).is_some()
    }

    pub fn occupant(&self, facility: NodeId) -> Option<PlayerId> {
        self.occupant.get(facility).copied().flatten()
    }

    /// Occupied facilities, ascending.
    pub fn occupied_facilities(&self) -> Vec<NodeId> {
        self.environment
            .candidates()
            .iter()
            .copied()
            .filter(|&facility| self.occupant[facility].is_some())
            .collect()
    }

    /// Unoccupied candidate facilities, ascending.
    pub fn free_facilities(&self) -> Vec<NodeId> {
        self.environment
            .candidates()
            .iter()
            .copied()
            .filter(|&facility| self.occupant[facility].is_none())
            .collect()
    }

    /// Copy of every player's facility and cached utility, by player id.
    pub fn snapshot(&self) -> Vec<PlayerState> {
        self.facility_of
            .iter()
            .zip(&self.utility_of)
            .map(|(&facility, &utility)| PlayerState { facility, utility })
            .collect()
    }

    /// Partition the market among the currently occupied facilities.
    pub fn partition(&mut self) -> MarketPartition {
        let occupied = self.occupied_facilities();
        MarketPartitioner::partition(&self.distances, &occupied, &mut self.rng)
    }

    /// Captured demand minus demand-weighted travel cost of the nodes
    /// `facility` serves in `partition`.
    pub fn utility(&self, facility: NodeId, partition: &MarketPartition) -> f64 {
        let demand = self.environment.demand();
        let (captured, cost) = partition
            .captured(facility)
            .fold((0.0, 0.0), |(captured, cost), node| {
                let d = f64::from(demand[node]);
                (captured + d, cost + d * self.distances.get(node, facility))
            });
        captured - cost
    }

    /// Let `player` switch to its best facility given everyone else's position.
    ///
    /// Every free candidate is evaluated in ascending order, the player's own
    /// (vacated) facility included. The incumbent is the current facility with its
    /// cached utility and is only displaced by a strictly greater utility. Returns
    /// whether the player moved; when it did not, the assignment state is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPlayer`] if `player` is not part of the game.
    pub fn best_response(&mut self, player: PlayerId) -> Result<bool> {
        let index = self.check_player(player)?;
        let current = self.facility_of[index];
        let mut best = (current, self.utility_of[index]);

        self.occupant[current] = None;
        let others = self.occupied_facilities();
        let options = self.free_facilities();

        let mut occupied = Vec::with_capacity(others.len() + 1);
        for option in options {
            occupied.clear();
            occupied.extend_from_slice(&others);
            let at = occupied.partition_point(|&f| f < option);
            occupied.insert(at, option);

            let partition = MarketPartitioner::partition(&self.distances, &occupied, &mut self.rng);
            let utility = self.utility(option, &partition);
            if utility > best.1 {
                best = (option, utility);
            }
        }

        let (facility, utility) = best;
        if facility == current {
            self.occupant[current] = Some(player);
            return Ok(false);
        }

        log::debug!(
            "player {player} moves {current} -> {facility} (utility {:.2} -> {utility:.2})",
            self.utility_of[index]
        );
        self.occupant[facility] = Some(player);
        self.facility_of[index] = facility;
        self.utility_of[index] = utility;
        Ok(true)
    }

    /// Demand-weighted distance from every node to the facility serving it.
    pub fn potential(&mut self) -> f64 {
        let partition = self.partition();
        let demand = self.environment.demand();
        partition
            .owners()
            .iter()
            .enumerate()
            .map(|(node, &facility)| f64::from(demand[node]) * self.distances.get(node, facility))
            .sum()
    }

    fn check_player(&self, player: PlayerId) -> Result<usize> {
        let index = player.value();
        if index < self.facility_of.len() {
            Ok(index)
        } else {
            Err(Error::UnknownPlayer {
                player: index,
                players: self.facility_of.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Edge;

    fn star_engine(n_players: usize, seed: u64) -> Result<BrdEngine> {
        // hub 0 with leaves 1..=4, every node a candidate
        let edges = (1..5).map(|leaf| Edge { a: 0, b: leaf, weight: 1 }).collect();
        let env = GraphEnvironment::from_parts(5, edges, vec![1; 5], (0..5).collect())?;
        let distances = DistanceMatrix::compute(&env);
        BrdEngine::new(Arc::new(env), Arc::new(distances), n_players, seed)
    }

    #[test]
    fn players_start_on_distinct_candidates() {
        let engine = star_engine(4, 3).unwrap();
        let mut facilities: Vec<NodeId> = engine.snapshot().iter().map(|p| p.facility).collect();
        facilities.sort_unstable();
        facilities.dedup();
        assert_eq!(facilities.len(), 4);
        assert_eq!(engine.occupied_facilities(), facilities);
        assert_eq!(engine.free_facilities().len(), 1);
    }

    #[test]
    fn too_many_players_is_rejected() {
        let err = star_engine(6, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::TooManyPlayers {
                players: 6,
                facilities: 5
            }
        ));
    }

    #[test]
    fn zero_players_is_rejected() {
        assert!(matches!(star_engine(0, 0), Err(Error::Configuration { .. })));
    }

    #[test]
    fn unknown_player_is_an_error() {
        let mut engine = star_engine(2, 1).unwrap();
        assert!(matches!(
            engine.best_response(PlayerId::new(2)),
            Err(Error::UnknownPlayer { player: 2, players: 2 })
        ));
    }

    #[test]
    fn lone_player_settles_on_the_hub() {
        // On a unit star the hub serves every leaf at distance 1 (utility 1),
        // a leaf pays 2 per far leaf (utility 1 + 0 - 3 = -2).
        let mut engine = star_engine(1, 8).unwrap();
        let _ = engine.best_response(PlayerId::new(0)).unwrap();
        assert_eq!(engine.facility_of(PlayerId::new(0)).unwrap(), 0);
        assert_eq!(engine.utility_of(PlayerId::new(0)).unwrap(), 1.0);
        assert!(!engine.best_response(PlayerId::new(0)).unwrap());
        assert_eq!(engine.potential(), 4.0);
    }
}
