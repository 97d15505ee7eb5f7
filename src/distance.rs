//! All-pairs shortest-path distances over the environment graph.
//!
//! Uses single-source Dijkstra from every node rather than exploiting the tree
//! structure, so the same matrix works for any connected weighted graph.

use petgraph::{
    algo::dijkstra,
    graph::{NodeIndex, UnGraph},
};
use serde::{Deserialize, Serialize};

use crate::{environment::GraphEnvironment, types::NodeId};

/// Dense, symmetric travel-cost matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMatrix {
    n_nodes: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute the matrix for `environment`. Unreachable pairs are `f64::INFINITY`.
    pub fn compute(environment: &GraphEnvironment) -> Self {
        let n_nodes = environment.n_nodes();
        let mut graph = UnGraph::<(), u32>::with_capacity(n_nodes, environment.edges().len());
        let indices: Vec<NodeIndex> = (0..n_nodes).map(|_| graph.add_node(())).collect();
        for edge in environment.edges() {
            graph.add_edge(indices[edge.a], indices[edge.b], edge.weight);
        }

        let mut values = vec![f64::INFINITY; n_nodes * n_nodes];
        for source in 0..n_nodes {
            let lengths = dijkstra(&graph, indices[source], None, |e| f64::from(*e.weight()));
            for (target, length) in lengths {
                values[source * n_nodes + target.index()] = length;
            }
        }

        Self { n_nodes, values }
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Shortest-path cost between `from` and `to`.
    #[inline]
    pub fn get(&self, from: NodeId, to: NodeId) -> f64 {
        self.values[from * self.n_nodes + to]
    }

    /// Distances from `from` to every node.
    pub fn row(&self, from: NodeId) -> &[f64] {
        &self.values[from * self.n_nodes..(from + 1) * self.n_nodes]
    }
}
