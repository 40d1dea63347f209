//! Node and edge betweenness (Brandes)
//!
//! Both variants share one single-source pass. Sources are split into
//! fixed-size chunks processed in parallel; chunk partials are summed in
//! chunk order, so scores are identical for any thread count.
//!
//! Distances are hop counts: edge weights are ignored.

use crate::centrality::CentralityScores;
use crate::graph::{CompressedGraph, NodeId};
use rayon::prelude::*;
use std::collections::{BTreeMap, VecDeque};

/// Edge identifier; undirected edges use `(min, max)`
pub type EdgeKey = (NodeId, NodeId);

/// Reusable buffers for one Brandes pass
struct BrandesState {
    stack: Vec<usize>,
    /// (predecessor, edge slot of predecessor -> node)
    pred: Vec<Vec<(usize, usize)>>,
    sigma: Vec<f64>,
    dist: Vec<i64>,
    delta: Vec<f64>,
    queue: VecDeque<usize>,
}

impl BrandesState {
    fn new(n: usize) -> Self {
        Self {
            stack: Vec::with_capacity(n),
            pred: vec![Vec::new(); n],
            sigma: vec![0.0; n],
            dist: vec![-1; n],
            delta: vec![0.0; n],
            queue: VecDeque::with_capacity(n),
        }
    }

    /// Shortest-path counting from `s`, then dependency accumulation into
    /// `node_acc` (per node) and `edge_acc` (per edge slot) when provided.
    fn accumulate(
        &mut self,
        graph: &CompressedGraph,
        s: usize,
        node_acc: Option<&mut [f64]>,
        edge_acc: Option<&mut [f64]>,
    ) {
        self.stack.clear();
        self.queue.clear();
        for i in 0..graph.node_count {
            self.pred[i].clear();
            self.sigma[i] = 0.0;
            self.dist[i] = -1;
            self.delta[i] = 0.0;
        }

        self.sigma[s] = 1.0;
        self.dist[s] = 0;
        self.queue.push_back(s);

        while let Some(v) = self.queue.pop_front() {
            self.stack.push(v);
            let start = graph.offsets[v] as usize;
            for (k, &w) in graph.outgoing_edges(v).iter().enumerate() {
                let w = w as usize;
                if self.dist[w] < 0 {
                    self.dist[w] = self.dist[v] + 1;
                    self.queue.push_back(w);
                }
                if self.dist[w] == self.dist[v] + 1 {
                    self.sigma[w] += self.sigma[v];
                    self.pred[w].push((v, start + k));
                }
            }
        }

        let mut node_acc = node_acc;
        let mut edge_acc = edge_acc;
        while let Some(w) = self.stack.pop() {
            for &(v, slot) in &self.pred[w] {
                let c = (self.sigma[v] / self.sigma[w]) * (1.0 + self.delta[w]);
                if let Some(acc) = edge_acc.as_deref_mut() {
                    acc[slot] += c;
                }
                self.delta[v] += c;
            }
            if w != s {
                if let Some(acc) = node_acc.as_deref_mut() {
                    acc[w] += self.delta[w];
                }
            }
        }
    }
}

/// Chunk size that depends only on the node count
fn chunk_size(n: usize) -> usize {
    ((n + 63) / 64).max(64)
}

/// Run Brandes from every source and return raw (unnormalised) node and
/// edge-slot accumulations
fn brandes(graph: &CompressedGraph, want_nodes: bool, want_edges: bool) -> (Vec<f64>, Vec<f64>) {
    let n = graph.node_count;
    let slots = graph.edges.len();
    let sources: Vec<usize> = (0..n).collect();

    let partials: Vec<(Vec<f64>, Vec<f64>)> = sources
        .par_chunks(chunk_size(n))
        .map(|chunk| {
            let mut state = BrandesState::new(n);
            let mut nodes = vec![0.0; if want_nodes { n } else { 0 }];
            let mut edges = vec![0.0; if want_edges { slots } else { 0 }];
            for &s in chunk {
                state.accumulate(
                    graph,
                    s,
                    want_nodes.then_some(nodes.as_mut_slice()),
                    want_edges.then_some(edges.as_mut_slice()),
                );
            }
            (nodes, edges)
        })
        .collect();

    let mut nodes = vec![0.0; if want_nodes { n } else { 0 }];
    let mut edges = vec![0.0; if want_edges { slots } else { 0 }];
    for (pn, pe) in partials {
        nodes.iter_mut().zip(pn).for_each(|(acc, v)| *acc += v);
        edges.iter_mut().zip(pe).for_each(|(acc, v)| *acc += v);
    }
    (nodes, edges)
}

/// Fraction of shortest paths between all pairs that pass through each
/// node, normalised by `1 / ((n - 1)(n - 2))`
pub fn betweenness_centrality(graph: &CompressedGraph) -> CentralityScores {
    let n = graph.node_count;
    if n <= 2 {
        return graph.node_ids.iter().map(|&id| (id, 0.0)).collect();
    }

    let (raw, _) = brandes(graph, true, false);
    let scale = 1.0 / ((n - 1) as f64 * (n - 2) as f64);

    graph
        .node_ids
        .iter()
        .zip(raw)
        .map(|(&id, b)| (id, b * scale))
        .collect()
}

/// Fraction of shortest paths between all pairs that traverse each edge,
/// normalised by `1 / (n (n - 1))`
pub fn edge_betweenness(graph: &CompressedGraph) -> BTreeMap<EdgeKey, f64> {
    let n = graph.node_count;
    let mut result = BTreeMap::new();
    if graph.edges.is_empty() {
        return result;
    }

    let (_, raw) = brandes(graph, false, true);
    let scale = if n > 1 {
        1.0 / (n as f64 * (n - 1) as f64)
    } else {
        1.0
    };

    for src in 0..n {
        let start = graph.offsets[src] as usize;
        for (k, &dst) in graph.outgoing_edges(src).iter().enumerate() {
            let (u, v) = (graph.node_ids[src], graph.node_ids[dst as usize]);
            let key = if graph.directed || u <= v { (u, v) } else { (v, u) };
            *result.entry(key).or_insert(0.0) += raw[start + k] * scale;
        }
    }
    result
}
