//! Random labelled trees via Prüfer sequences.

use std::{cmp::Reverse, collections::BinaryHeap};

use rand::Rng;

use crate::types::NodeId;

/// Draw a uniformly random labelled tree on `n_nodes` nodes.
///
/// Every one of the `n^(n-2)` labelled trees is equally likely. Consumes exactly
/// `n_nodes - 2` draws from `rng` (none for `n_nodes <= 2`).
pub fn random_tree<R: Rng + ?Sized>(n_nodes: usize, rng: &mut R) -> Vec<(NodeId, NodeId)> {
    match n_nodes {
        0 | 1 => Vec::new(),
        2 => vec![(0, 1)],
        _ => {
            let sequence: Vec<NodeId> = (0..n_nodes - 2)
                .map(|_| rng.random_range(0..n_nodes))
                .collect();
            decode_prufer(&sequence, n_nodes)
        }
    }
}

/// Decode a Prüfer sequence into the edge list of its tree.
///
/// All entries of `sequence` must be `< n_nodes` and `sequence.len() == n_nodes - 2`.
pub fn decode_prufer(sequence: &[NodeId], n_nodes: usize) -> Vec<(NodeId, NodeId)> {
    debug_assert_eq!(sequence.len() + 2, n_nodes);
    let mut degree = vec![1usize; n_nodes];
    for &node in sequence {
        degree[node] += 1;
    }

    let mut leaves: BinaryHeap<Reverse<NodeId>> = (0..n_nodes)
        .filter(|&node| degree[node] == 1)
        .map(Reverse)
        .collect();

    let mut edges = Vec::with_capacity(n_nodes.saturating_sub(1));
    for &node in sequence {
        let Some(Reverse(leaf)) = leaves.pop() else {
            break;
        };
        edges.push((leaf, node));
        degree[node] -= 1;
        if degree[node] == 1 {
            leaves.push(Reverse(node));
        }
    }

    if let (Some(Reverse(a)), Some(Reverse(b))) = (leaves.pop(), leaves.pop()) {
        edges.push((a, b));
    }
    edges
}

/// Whether `edges` form a spanning tree over `0..n_nodes`.
pub fn is_spanning_tree(n_nodes: usize, edges: &[(NodeId, NodeId)]) -> bool {
    if n_nodes == 0 || edges.len() != n_nodes - 1 {
        return false;
    }
    let mut parent: Vec<usize> = (0..n_nodes).collect();

    fn find(parent: &mut [usize], mut node: usize) -> usize {
        while parent[node] != node {
            parent[node] = parent[parent[node]];
            node = parent[node];
        }
        node
    }

    for &(a, b) in edges {
        if a >= n_nodes || b >= n_nodes {
            return false;
        }
        let (root_a, root_b) = (find(&mut parent, a), find(&mut parent, b));
        if root_a == root_b {
            return false;
        }
        parent[root_a] = root_b;
    }
    true
}
