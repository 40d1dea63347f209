//! Immutable index-based graph snapshot

use crate::graph::NodeId;

/// Compressed sparse row snapshot of a [`Graph`](crate::graph::Graph).
///
/// Node `i` is the i-th smallest node id. Undirected edges are stored in
/// both directions; directed edges only in their source row.
#[derive(Debug, Clone, Default)]
pub struct CompressedGraph {
    /// Number of nodes in the graph
    pub node_count: usize,

    /// Whether `edges` holds ordered pairs
    pub directed: bool,

    /// Offset array: index where each node's edges begin
    /// offsets[i] to offsets[i+1] defines the edge range for node i
    pub offsets: Vec<u32>,

    /// Edge array: concatenated, sorted lists of target indices
    pub edges: Vec<u32>,

    /// Edge weights aligned with `edges`, present for weighted graphs
    pub weights: Option<Vec<f64>>,

    /// Mapping from internal indices to node ids (ascending)
    pub node_ids: Vec<NodeId>,
}

impl CompressedGraph {
    /// Create a new graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            directed: false,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count),
            weights: None,
            node_ids: Vec::with_capacity(node_count),
        }
    }

    /// Get outgoing edges for a node
    pub fn outgoing_edges(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Weights of the outgoing edges, unit weights when unweighted
    pub fn outgoing_weights(&self, node: usize) -> impl Iterator<Item = f64> + '_ {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        (start..end).map(move |i| self.weights.as_ref().map_or(1.0, |w| w[i]))
    }

    /// Edge-reversed copy. Undirected graphs are their own transpose.
    pub fn transposed(&self) -> CompressedGraph {
        if !self.directed {
            return self.clone();
        }

        let n = self.node_count;
        let mut in_counts = vec![0u32; n];
        for &dst in &self.edges {
            in_counts[dst as usize] += 1;
        }

        let mut transposed = CompressedGraph::with_capacity(n, self.edges.len());
        transposed.directed = true;
        transposed.node_ids = self.node_ids.clone();
        transposed.offsets.push(0);
        let mut offset = 0;
        for &count in &in_counts {
            offset += count;
            transposed.offsets.push(offset);
        }

        transposed.edges.resize(self.edges.len(), 0);
        let mut weights = self.weights.as_ref().map(|w| vec![0.0; w.len()]);
        let mut current_pos = vec![0usize; n];

        // Sources are visited in ascending order, so each row stays sorted
        for src in 0..n {
            let start = self.offsets[src] as usize;
            for (k, &dst) in self.outgoing_edges(src).iter().enumerate() {
                let d = dst as usize;
                let pos = transposed.offsets[d] as usize + current_pos[d];
                transposed.edges[pos] = src as u32;
                if let (Some(out), Some(inp)) = (weights.as_mut(), self.weights.as_ref()) {
                    out[pos] = inp[start + k];
                }
                current_pos[d] += 1;
            }
        }
        transposed.weights = weights;
        transposed
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GraphMode;
    use crate::graph::Graph;

    #[test]
    fn transpose_reverses_directed_edges() {
        let g = Graph::from_edges(
            GraphMode::new(true, true),
            vec![(0, 1, 2.0), (0, 2, 3.0), (2, 1, 4.0)],
        );
        let c = g.compress();
        let t = c.transposed();
        assert_eq!(t.outgoing_edges(1), &[0, 2]);
        assert_eq!(t.outgoing_edges(0), &[] as &[u32]);
        assert_eq!(t.outgoing_weights(1).collect::<Vec<_>>(), vec![2.0, 4.0]);
    }

    #[test]
    fn unweighted_graph_reports_unit_weights() {
        let g = Graph::from_edges(GraphMode::default(), vec![(0, 1, 9.0)]);
        let c = g.compress();
        assert!(c.weights.is_none());
        assert_eq!(c.outgoing_weights(0).collect::<Vec<_>>(), vec![1.0]);
    }
}
