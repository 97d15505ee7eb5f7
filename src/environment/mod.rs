//! Game environment: a weighted random tree, node demand and candidate facilities
//!
//! The environment is generated once per run from a seed and never mutated
//! afterwards. Everything downstream (distances, the dynamics engine) borrows it
//! read-only.

pub mod distribution;
pub mod tree;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

pub use distribution::{Distribution, DistributionSpec, Sampler};

use crate::{Error, Result, types::NodeId};

/// A weighted, undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    /// Transport cost, always >= 1
    pub weight: u32,
}

/// Parameters needed to generate an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub n_nodes: usize,
    pub n_potential_facilities: usize,
    pub seed: u64,
    pub demand_distribution: DistributionSpec,
    pub cost_distribution: DistributionSpec,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            n_nodes: 100,
            n_potential_facilities: 80,
            seed: 66,
            demand_distribution: DistributionSpec::normal(20.0, 5.0),
            cost_distribution: DistributionSpec::normal(5.0, 1.0),
        }
    }
}

/// Weighted tree with per-node demand and the set of nodes allowed to host a facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEnvironment {
    n_nodes: usize,
    edges: Vec<Edge>,
    demand: Vec<u32>,
    candidate_mask: Vec<bool>,
    candidates: Vec<NodeId>,
}

impl GraphEnvironment {
    /// Generate a random environment.
    ///
    /// A single stream seeded with `config.seed` is consumed in this order: tree
    /// topology, edge costs (edge order), demand (node order), candidate facilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the facility count is outside
    /// `[1, n_nodes]` or a distribution is unsupported or malformed.
    pub fn generate(config: &EnvironmentConfig) -> Result<Self> {
        check_facility_count(config.n_nodes, config.n_potential_facilities)?;
        let cost = Distribution::try_from(&config.cost_distribution)?.sampler()?;
        let demand = Distribution::try_from(&config.demand_distribution)?.sampler()?;

        let mut rng = StdRng::seed_from_u64(config.seed);

        let edges = tree::random_tree(config.n_nodes, &mut rng)
            .into_iter()
            .map(|(a, b)| Edge {
                a,
                b,
                weight: cost.sample_cost(&mut rng),
            })
            .collect();

        let demand = (0..config.n_nodes)
            .map(|_| demand.sample_demand(&mut rng))
            .collect();

        let mut candidates =
            rand::seq::index::sample(&mut rng, config.n_nodes, config.n_potential_facilities)
                .into_vec();
        candidates.sort_unstable();

        Ok(Self::assemble(config.n_nodes, edges, demand, candidates))
    }

    /// Build an environment from explicit parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the edges do not form a spanning tree, a
    /// weight or demand is zero, `demand` has the wrong length, or the candidates
    /// are out of range, duplicated, or empty.
    pub fn from_parts(
        n_nodes: usize,
        edges: Vec<Edge>,
        demand: Vec<u32>,
        candidates: Vec<NodeId>,
    ) -> Result<Self> {
        let endpoints: Vec<(NodeId, NodeId)> = edges.iter().map(|e| (e.a, e.b)).collect();
        if !tree::is_spanning_tree(n_nodes, &endpoints) {
            return Err(Error::configuration(format!(
                "edges do not form a spanning tree over {n_nodes} nodes"
            )));
        }
        if let Some(edge) = edges.iter().find(|e| e.weight == 0) {
            return Err(Error::configuration(format!(
                "edge {}-{} has zero cost",
                edge.a, edge.b
            )));
        }
        if demand.len() != n_nodes {
            return Err(Error::configuration(format!(
                "expected {n_nodes} demand values, got {}",
                demand.len()
            )));
        }
        if let Some(node) = demand.iter().position(|&d| d == 0) {
            return Err(Error::configuration(format!("node {node} has zero demand")));
        }

        let mut candidates = candidates;
        candidates.sort_unstable();
        candidates.dedup();
        if let Some(&node) = candidates.iter().find(|&&c| c >= n_nodes) {
            return Err(Error::configuration(format!(
                "candidate facility {node} is not a node"
            )));
        }
        check_facility_count(n_nodes, candidates.len())?;

        Ok(Self::assemble(n_nodes, edges, demand, candidates))
    }

    fn assemble(n_nodes: usize, edges: Vec<Edge>, demand: Vec<u32>, candidates: Vec<NodeId>) -> Self {
        let mut candidate_mask = vec![false; n_nodes];
        for &node in &candidates {
            candidate_mask[node] = true;
        }
        Self {
            n_nodes,
            edges,
            demand,
            candidate_mask,
            candidates,
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Demand of every node, indexed by node id.
    pub fn demand(&self) -> &[u32] {
        &self.demand
    }

    pub fn demand_of(&self, node: NodeId) -> u32 {
        self.demand[node]
    }

    pub fn total_demand(&self) -> u64 {
        self.demand.iter().map(|&d| u64::from(d)).sum()
    }

    pub fn candidate_mask(&self) -> &[bool] {
        &self.candidate_mask
    }

    /// Candidate facility nodes in ascending order.
    pub fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    pub fn n_candidates(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_candidate(&self, node: NodeId) -> bool {
        self.candidate_mask.get(node).copied().unwrap_or(false)
    }
}

fn check_facility_count(n_nodes: usize, n_potential_facilities: usize) -> Result<()> {
    if n_nodes == 0 {
        return Err(Error::configuration("graph needs at least one node"));
    }
    if n_potential_facilities < 1 {
        return Err(Error::configuration(
            "number of potential facilities must be at least 1",
        ));
    }
    if n_potential_facilities > n_nodes {
        return Err(Error::configuration(format!(
            "number of potential facilities ({n_potential_facilities}) cannot exceed number of nodes ({n_nodes})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n_nodes: usize, n_potential_facilities: usize) -> EnvironmentConfig {
        EnvironmentConfig {
            n_nodes,
            n_potential_facilities,
            seed: 7,
            ..EnvironmentConfig::default()
        }
    }

    #[test]
    fn generated_environment_respects_sizes() {
        let env = GraphEnvironment::generate(&config(30, 12)).unwrap();
        assert_eq!(env.n_nodes(), 30);
        assert_eq!(env.edges().len(), 29);
        assert_eq!(env.demand().len(), 30);
        assert_eq!(env.candidates().len(), 12);
        assert_eq!(env.candidate_mask().iter().filter(|&&c| c).count(), 12);
        assert!(env.candidates().windows(2).all(|w| w[0] < w[1]));
        assert!(env.edges().iter().all(|e| e.weight >= 1));
        assert!(env.demand().iter().all(|&d| d >= 1));
    }

    #[test]
    fn facility_count_out_of_range_is_a_configuration_error() {
        for (nodes, facilities) in [(5, 0), (5, 6)] {
            let err = GraphEnvironment::generate(&config(nodes, facilities)).unwrap_err();
            assert!(matches!(err, Error::Configuration { .. }));
        }
    }

    #[test]
    fn unsupported_distribution_is_a_configuration_error() {
        let cfg = EnvironmentConfig {
            demand_distribution: DistributionSpec::new("pareto", 1.0, 2.0),
            ..config(10, 3)
        };
        let err = GraphEnvironment::generate(&cfg).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn same_seed_same_environment() {
        let a = GraphEnvironment::generate(&config(25, 10)).unwrap();
        let b = GraphEnvironment::generate(&config(25, 10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn from_parts_rejects_non_tree() {
        let edges = vec![
            Edge { a: 0, b: 1, weight: 1 },
            Edge { a: 1, b: 2, weight: 1 },
            Edge { a: 2, b: 0, weight: 1 },
        ];
        let err = GraphEnvironment::from_parts(3, edges, vec![1; 3], vec![0]).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn from_parts_normalizes_candidates() {
        let edges = vec![Edge { a: 0, b: 1, weight: 2 }, Edge { a: 1, b: 2, weight: 3 }];
        let env = GraphEnvironment::from_parts(3, edges, vec![1, 2, 3], vec![2, 0, 2]).unwrap();
        assert_eq!(env.candidates(), &[0, 2]);
        assert!(env.is_candidate(2));
        assert!(!env.is_candidate(1));
        assert!(!env.is_candidate(99));
        assert_eq!(env.total_demand(), 6);
    }
}
