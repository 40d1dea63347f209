//! Connectivity and path-based graph statistics

use crate::error::AnalysisError;
use crate::graph::{CompressedGraph, Graph, NodeId};
use petgraph::graph::DiGraph;
use rayon::prelude::*;
use std::collections::VecDeque;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Attach smaller tree under root of larger tree
        let rank_x = self.rank[root_x as usize];
        let rank_y = self.rank[root_y as usize];

        if rank_x > rank_y {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += rank_y;
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += rank_x;
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.rank[root as usize]
    }
}

/// Group node indices by Union-Find root. Components come out ordered by
/// their smallest index, members ascending.
fn group_by_root(sets: &mut DisjointSets, node_count: usize) -> Vec<Vec<u32>> {
    let mut slot_of_root = vec![usize::MAX; node_count];
    let mut groups: Vec<Vec<u32>> = Vec::new();

    for node in 0..node_count as u32 {
        let root = sets.find(node) as usize;
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[slot_of_root[root]].push(node);
    }
    groups
}

/// Connected components of an undirected snapshot, or weakly connected
/// components of a directed one, as index lists
pub fn connected_component_indices(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let mut sets = DisjointSets::new(graph.node_count);
    for src in 0..graph.node_count {
        for &dst in graph.outgoing_edges(src) {
            sets.union(src as u32, dst);
        }
    }
    group_by_root(&mut sets, graph.node_count)
}

/// Strongly connected components as index lists, ordered like
/// [`connected_component_indices`]
pub fn strong_component_indices(graph: &CompressedGraph) -> Vec<Vec<u32>> {
    let mut digraph: DiGraph<(), ()> = DiGraph::with_capacity(graph.node_count, graph.edges.len());
    for _ in 0..graph.node_count {
        digraph.add_node(());
    }
    digraph.extend_with_edges((0..graph.node_count).flat_map(|src| {
        graph
            .outgoing_edges(src)
            .iter()
            .map(move |&dst| (src as u32, dst))
    }));

    let mut components: Vec<Vec<u32>> = petgraph::algo::kosaraju_scc(&digraph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<u32> = component.into_iter().map(|n| n.index() as u32).collect();
            members.sort_unstable();
            members
        })
        .collect();
    components.sort_unstable_by_key(|members| members[0]);
    components
}

fn resolve(graph: &CompressedGraph, components: Vec<Vec<u32>>) -> Vec<Vec<NodeId>> {
    components
        .into_iter()
        .map(|members| {
            members
                .into_iter()
                .map(|idx| graph.node_ids[idx as usize])
                .collect()
        })
        .collect()
}

/// Connected components (undirected) or weakly connected components (directed)
pub fn connected_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let compressed = graph.compress();
    let components = connected_component_indices(&compressed);
    resolve(&compressed, components)
}

/// Strongly connected components; equal to connected components when undirected
pub fn strongly_connected_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let compressed = graph.compress();
    let components = if graph.is_directed() {
        strong_component_indices(&compressed)
    } else {
        connected_component_indices(&compressed)
    };
    resolve(&compressed, components)
}

/// Components that define the giant component: strong ones for directed
/// graphs, plain connected ones otherwise
pub fn components(graph: &Graph) -> Vec<Vec<NodeId>> {
    strongly_connected_components(graph)
}

/// Number of connected components
pub fn number_connected_components(graph: &Graph) -> usize {
    connected_component_indices(&graph.compress()).len()
}

/// Largest component by node count; the first one wins a tie
pub fn largest_component(graph: &Graph) -> Vec<NodeId> {
    components(graph)
        .into_iter()
        .fold(Vec::new(), |best, c| if c.len() > best.len() { c } else { best })
}

/// Induced subgraph on the largest (strongly) connected component
pub fn largest_component_subgraph(graph: &Graph) -> Graph {
    let giant = largest_component(graph);
    log::info!(
        "Largest {} component holds {} of {} nodes",
        if graph.is_directed() { "strongly connected" } else { "connected" },
        giant.len(),
        graph.node_count()
    );
    graph.induced_subgraph(&giant)
}

/// Fraction of remaining nodes inside the giant component.
///
/// Returns 0 for a graph with no nodes or no edges.
pub fn giant_fraction(graph: &Graph) -> f64 {
    if graph.node_count() == 0 || graph.edge_count() == 0 {
        return 0.0;
    }
    largest_component(graph).len() as f64 / graph.node_count() as f64
}

/// Breadth-first hop distances from `source`; unreachable nodes stay at -1
pub fn bfs_distances(graph: &CompressedGraph, source: usize) -> Vec<i64> {
    let mut dist = vec![-1i64; graph.node_count];
    let mut queue = VecDeque::with_capacity(graph.node_count);
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        for &w in graph.outgoing_edges(v) {
            let w = w as usize;
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Sum of reciprocal hop distances from `source` to every other node
fn inverse_distance_sum(graph: &CompressedGraph, source: usize) -> f64 {
    bfs_distances(graph, source)
        .into_iter()
        .filter(|&d| d > 0)
        .map(|d| 1.0 / d as f64)
        .sum()
}

/// Global efficiency: mean reciprocal shortest-path length over all ordered
/// pairs of distinct nodes, unreachable pairs counting as 0.
///
/// Distances ignore weights. Directed graphs follow edge direction.
/// Per-source sums are computed in parallel and added in source order, so
/// the result does not depend on the thread count.
pub fn global_efficiency(graph: &CompressedGraph) -> Result<f64, AnalysisError> {
    let n = graph.node_count;
    if n < 2 {
        return Ok(0.0);
    }

    let per_source: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|s| inverse_distance_sum(graph, s))
        .collect();
    let total: f64 = per_source.iter().sum();

    let efficiency = total / (n as f64 * (n as f64 - 1.0));
    if !efficiency.is_finite() {
        return Err(AnalysisError::DegenerateGraph(format!(
            "efficiency evaluated to {} on {} nodes",
            efficiency, n
        )));
    }
    Ok(efficiency)
}
