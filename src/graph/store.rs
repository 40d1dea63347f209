//! Mutable graph storage with node and edge removal

use crate::config::GraphMode;
use crate::graph::CompressedGraph;
use std::collections::{BTreeMap, BTreeSet};

/// External node identifier as it appears in the edge list
pub type NodeId = u64;

/// Neighbour maps of a single node. `incoming` stays empty for undirected graphs.
#[derive(Debug, Clone, Default)]
struct Adjacency {
    outgoing: BTreeMap<NodeId, f64>,
    incoming: BTreeMap<NodeId, f64>,
}

/// Mutable graph used as the object of both removal algorithms.
///
/// Nodes live in a `BTreeMap`, so every traversal visits node ids in
/// ascending order. That order is what makes component listings, ranking
/// tie-breaks and compressed snapshots reproducible.
#[derive(Debug, Clone)]
pub struct Graph {
    directed: bool,
    weighted: bool,
    nodes: BTreeMap<NodeId, Adjacency>,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph in the given mode
    pub fn new(mode: GraphMode) -> Self {
        Self {
            directed: mode.directed,
            weighted: mode.weighted,
            nodes: BTreeMap::new(),
            edge_count: 0,
        }
    }

    /// Build a graph from `(source, target, weight)` triples
    pub fn from_edges<I>(mode: GraphMode, edges: I) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut graph = Self::new(mode);
        for (src, dst, weight) in edges {
            graph.add_edge(src, dst, weight);
        }
        graph
    }

    pub fn mode(&self) -> GraphMode {
        GraphMode::new(self.directed, self.weighted)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Node ids in ascending order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Add an isolated node; a no-op if it already exists
    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.entry(node).or_default();
    }

    /// Add an edge, creating missing endpoints. Re-adding an existing edge
    /// only replaces its weight. Unweighted graphs store unit weights.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, weight: f64) {
        let weight = if self.weighted { weight } else { 1.0 };
        self.add_node(src);
        self.add_node(dst);

        let is_new = self
            .nodes
            .get_mut(&src)
            .map(|adj| adj.outgoing.insert(dst, weight).is_none())
            .unwrap_or(false);

        if let Some(adj) = self.nodes.get_mut(&dst) {
            if self.directed {
                adj.incoming.insert(src, weight);
            } else {
                adj.outgoing.insert(src, weight);
            }
        }

        if is_new {
            self.edge_count += 1;
        }
    }

    pub fn has_edge(&self, src: NodeId, dst: NodeId) -> bool {
        self.nodes
            .get(&src)
            .map_or(false, |adj| adj.outgoing.contains_key(&dst))
    }

    pub fn edge_weight(&self, src: NodeId, dst: NodeId) -> Option<f64> {
        self.nodes.get(&src)?.outgoing.get(&dst).copied()
    }

    /// Remove an edge. Returns false if it was not present.
    pub fn remove_edge(&mut self, src: NodeId, dst: NodeId) -> bool {
        let removed = self
            .nodes
            .get_mut(&src)
            .map_or(false, |adj| adj.outgoing.remove(&dst).is_some());
        if !removed {
            return false;
        }

        if let Some(adj) = self.nodes.get_mut(&dst) {
            if self.directed {
                adj.incoming.remove(&src);
            } else {
                adj.outgoing.remove(&src);
            }
        }
        self.edge_count -= 1;
        true
    }

    /// Remove a node and all incident edges.
    ///
    /// Absent nodes are silently ignored; the return value only tells the
    /// caller whether anything changed.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        let Some(adj) = self.nodes.remove(&node) else {
            return false;
        };

        let self_loop = adj.outgoing.contains_key(&node);
        let mut removed = adj.outgoing.len() + adj.incoming.len();
        if self.directed && self_loop {
            // The loop sits in both maps but is one edge
            removed -= 1;
        }

        for &dst in adj.outgoing.keys() {
            if let Some(other) = self.nodes.get_mut(&dst) {
                if self.directed {
                    other.incoming.remove(&node);
                } else {
                    other.outgoing.remove(&node);
                }
            }
        }
        for &src in adj.incoming.keys() {
            if let Some(other) = self.nodes.get_mut(&src) {
                other.outgoing.remove(&node);
            }
        }

        self.edge_count -= removed;
        true
    }

    /// Successors (directed) or neighbours (undirected) in ascending order
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|adj| adj.outgoing.keys().copied())
    }

    /// Predecessors of a node; equal to `neighbors` for undirected graphs
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let directed = self.directed;
        self.nodes.get(&node).into_iter().flat_map(move |adj| {
            if directed {
                adj.incoming.keys().copied()
            } else {
                adj.outgoing.keys().copied()
            }
        })
    }

    /// Number of edge endpoints at `node`. Undirected self-loops count twice,
    /// directed degree is in-degree plus out-degree.
    pub fn degree(&self, node: NodeId) -> usize {
        let Some(adj) = self.nodes.get(&node) else {
            return 0;
        };
        if self.directed {
            adj.outgoing.len() + adj.incoming.len()
        } else {
            adj.outgoing.len() + usize::from(adj.outgoing.contains_key(&node))
        }
    }

    /// Every edge once as `(source, target, weight)`. Undirected edges are
    /// reported with `source <= target`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        let directed = self.directed;
        self.nodes.iter().flat_map(move |(&src, adj)| {
            adj.outgoing
                .iter()
                .filter(move |(dst, _)| directed || src <= **dst)
                .map(move |(&dst, &w)| (src, dst, w))
        })
    }

    pub fn self_loops(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(id, adj)| adj.outgoing.contains_key(*id))
            .map(|(&id, _)| id)
            .collect()
    }

    pub fn remove_self_loops(&mut self) -> usize {
        let loops = self.self_loops();
        for &node in &loops {
            self.remove_edge(node, node);
        }
        loops.len()
    }

    /// Reset every weight to 1 and mark the graph unweighted
    pub fn drop_weights(&mut self) {
        for adj in self.nodes.values_mut() {
            adj.outgoing.values_mut().for_each(|w| *w = 1.0);
            adj.incoming.values_mut().for_each(|w| *w = 1.0);
        }
        self.weighted = false;
    }

    /// Undirected copy where `u - v` exists if `u -> v` or `v -> u` does.
    /// When both directions exist the weight of the lower-id source wins.
    pub fn to_undirected(&self) -> Graph {
        let mut undirected = Graph::new(GraphMode::new(false, self.weighted));
        for node in self.nodes() {
            undirected.add_node(node);
        }
        for (src, dst, weight) in self.edges() {
            if !undirected.has_edge(src, dst) {
                undirected.add_edge(src, dst, weight);
            }
        }
        undirected
    }

    /// New graph restricted to `keep` and the edges between them
    pub fn induced_subgraph(&self, keep: &[NodeId]) -> Graph {
        let keep: BTreeSet<NodeId> = keep
            .iter()
            .copied()
            .filter(|n| self.contains_node(*n))
            .collect();

        let mut subgraph = Graph::new(self.mode());
        for &node in &keep {
            subgraph.add_node(node);
        }
        for (src, dst, weight) in self.edges() {
            if keep.contains(&src) && keep.contains(&dst) {
                subgraph.add_edge(src, dst, weight);
            }
        }
        subgraph
    }

    /// Index-based snapshot for the traversal-heavy algorithms
    pub fn compress(&self) -> CompressedGraph {
        let node_ids: Vec<NodeId> = self.nodes().collect();
        let adjacency_total: usize = self.nodes.values().map(|adj| adj.outgoing.len()).sum();

        let mut compressed = CompressedGraph::with_capacity(node_ids.len(), adjacency_total);
        compressed.directed = self.directed;

        let mut weights = Vec::with_capacity(if self.weighted { adjacency_total } else { 0 });
        compressed.offsets.push(0);
        let mut offset = 0u32;

        for adj in self.nodes.values() {
            for (dst, &w) in &adj.outgoing {
                // node_ids is sorted, so the lookup cannot miss
                let idx = node_ids.binary_search(dst).unwrap_or_else(|i| i);
                compressed.edges.push(idx as u32);
                if self.weighted {
                    weights.push(w);
                }
                offset += 1;
            }
            compressed.offsets.push(offset);
        }

        if self.weighted {
            compressed.weights = Some(weights);
        }
        compressed.node_ids = node_ids;
        compressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn undirected(edges: &[(NodeId, NodeId)]) -> Graph {
        Graph::from_edges(
            GraphMode::default(),
            edges.iter().map(|&(u, v)| (u, v, 1.0)),
        )
    }

    #[test]
    fn counts_nodes_and_edges() {
        let g = undirected(&[(0, 1), (1, 2), (2, 0), (1, 0)]);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        assert!(g.has_edge(1, 0));
        assert!(g.has_edge(0, 1));
    }

    #[test]
    fn remove_node_is_idempotent() {
        let mut g = undirected(&[(0, 1), (1, 2), (2, 3)]);
        assert!(g.remove_node(1));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
        assert!(!g.remove_node(1));
        assert!(!g.remove_node(42));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn directed_removal_cleans_both_sides() {
        let mut g = Graph::from_edges(
            GraphMode::new(true, false),
            vec![(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0), (1, 1, 1.0)],
        );
        assert_eq!(g.edge_count(), 4);
        assert_eq!(g.degree(1), 5);
        g.remove_node(1);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.neighbors(0).count(), 0);
        assert_eq!(g.predecessors(2).count(), 0);
    }

    #[test]
    fn undirected_self_loop_counts_twice_in_degree() {
        let mut g = undirected(&[(0, 0), (0, 1)]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.remove_self_loops(), 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn to_undirected_unions_reciprocal_edges() {
        let g = Graph::from_edges(
            GraphMode::new(true, true),
            vec![(0, 1, 5.0), (1, 0, 7.0), (1, 2, 3.0)],
        );
        let mut u = g.to_undirected();
        assert!(!u.is_directed());
        assert_eq!(u.edge_count(), 2);
        assert_eq!(u.edge_weight(0, 1), Some(5.0));
        u.drop_weights();
        assert!(!u.is_weighted());
        assert_eq!(u.edge_weight(2, 1), Some(1.0));
    }

    #[test]
    fn induced_subgraph_keeps_inner_edges() {
        let g = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let sub = g.induced_subgraph(&[0, 1, 2, 99]);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 2);
        assert!(!sub.has_edge(3, 0));
    }

    #[test]
    fn compress_maps_ids_to_sorted_indices() {
        let g = undirected(&[(10, 30), (30, 20)]);
        let c = g.compress();
        assert_eq!(c.node_ids, vec![10, 20, 30]);
        assert_eq!(c.outgoing_edges(2), &[0, 1]);
        assert_eq!(c.outgoing_edges(1), &[2]);
    }
}
