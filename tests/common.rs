//! Common test utilities for the flg test suite.
//!
//! Builders for small hand-made networks whose distances are easy to reason about.

#![allow(dead_code)]

use std::sync::Arc;

use flg::{
    BrdEngine, DistanceMatrix, GraphEnvironment, NodeId, Result,
    environment::{Edge, EnvironmentConfig},
};

/// Path `0 - 1 - ... - (n-1)` with the given edge costs and unit demand.
pub fn path_environment(costs: &[u32], candidates: Vec<NodeId>) -> GraphEnvironment {
    let n_nodes = costs.len() + 1;
    let edges = costs
        .iter()
        .enumerate()
        .map(|(i, &weight)| Edge {
            a: i,
            b: i + 1,
            weight,
        })
        .collect();
    GraphEnvironment::from_parts(n_nodes, edges, vec![1; n_nodes], candidates)
        .expect("valid path environment")
}

/// Path whose edge costs are distinct powers of two.
///
/// Any two disjoint sets of edges have different total cost, so no node is ever
/// equidistant from two different facilities and partitions never draw.
pub fn tie_free_path(n_nodes: usize) -> GraphEnvironment {
    let costs: Vec<u32> = (0..n_nodes - 1).map(|i| 1 << i).collect();
    path_environment(&costs, (0..n_nodes).collect())
}

/// Random environment with the library's default distributions.
pub fn random_environment(n_nodes: usize, n_candidates: usize, seed: u64) -> GraphEnvironment {
    GraphEnvironment::generate(&EnvironmentConfig {
        n_nodes,
        n_potential_facilities: n_candidates,
        seed,
        ..EnvironmentConfig::default()
    })
    .expect("valid random environment")
}

/// Engine over `environment` with distances computed from it.
pub fn engine(environment: GraphEnvironment, n_players: usize, seed: u64) -> Result<BrdEngine> {
    let distances = DistanceMatrix::compute(&environment);
    BrdEngine::new(Arc::new(environment), Arc::new(distances), n_players, seed)
}

/// Check the occupancy invariants of an engine.
pub fn assert_occupancy_consistent(engine: &BrdEngine) {
    let occupied = engine.occupied_facilities();
    assert_eq!(occupied.len(), engine.n_players());
    for facility in &occupied {
        assert!(engine.environment().is_candidate(*facility));
    }
    let mut held: Vec<NodeId> = engine.snapshot().iter().map(|p| p.facility).collect();
    held.sort_unstable();
    assert_eq!(held, occupied, "players and occupancy disagree");
    for player in engine.players() {
        let facility = engine.facility_of(player).unwrap();
        assert_eq!(engine.occupant(facility), Some(player));
    }
}
