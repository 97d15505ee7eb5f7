//! Nearest-facility market partitioning with random tie-breaking.

use std::collections::BTreeMap;

use rand::Rng;

use crate::{distance::DistanceMatrix, types::NodeId};

/// Assignment of every node to the occupied facility that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPartition {
    owner: Vec<NodeId>,
}

impl MarketPartition {
    /// Facility serving `node`.
    pub fn owner(&self, node: NodeId) -> NodeId {
        self.owner[node]
    }

    /// Owning facility for every node, indexed by node id.
    pub fn owners(&self) -> &[NodeId] {
        &self.owner
    }

    /// Nodes captured by `facility`, ascending.
    pub fn captured(&self, facility: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.owner
            .iter()
            .enumerate()
            .filter(move |&(_, &owner)| owner == facility)
            .map(|(node, _)| node)
    }

    /// Facility -> captured nodes.
    pub fn regions(&self) -> BTreeMap<NodeId, Vec<NodeId>> {
        let mut regions: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (node, &facility) in self.owner.iter().enumerate() {
            regions.entry(facility).or_default().push(node);
        }
        regions
    }

    /// Number of partitioned nodes.
    pub fn len(&self) -> usize {
        self.owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }
}

/// Splits the network among a set of occupied facilities.
pub struct MarketPartitioner;

impl MarketPartitioner {
    /// Assign every node to its nearest facility in `occupied`.
    ///
    /// `occupied` must be sorted ascending. Nodes are visited in ascending order; an
    /// occupied node always keeps itself, and a node with several facilities at the
    /// same minimum distance takes one of them uniformly at random. Exactly one
    /// draw is made from `rng` per tied node and none otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `occupied` is empty.
    pub fn partition<R: Rng + ?Sized>(
        distances: &DistanceMatrix,
        occupied: &[NodeId],
        rng: &mut R,
    ) -> MarketPartition {
        assert!(!occupied.is_empty(), "cannot partition without facilities");
        debug_assert!(occupied.windows(2).all(|w| w[0] < w[1]));

        let mut tied = Vec::with_capacity(occupied.len());
        let owner = (0..distances.n_nodes())
            .map(|node| {
                if occupied.binary_search(&node).is_ok() {
                    return node;
                }
                let row = distances.row(node);
                let mut nearest = f64::INFINITY;
                tied.clear();
                for &facility in occupied {
                    let distance = row[facility];
                    if distance < nearest {
                        nearest = distance;
                        tied.clear();
                        tied.push(facility);
                    } else if distance == nearest {
                        tied.push(facility);
                    }
                }
                match tied.len() {
                    0 => occupied[0],
                    1 => tied[0],
                    n => tied[rng.random_range(0..n)],
                }
            })
            .collect();

        MarketPartition { owner }
    }
}
