//! Degree centrality

use crate::centrality::CentralityScores;
use crate::graph::Graph;

/// Fraction of the other nodes each node is adjacent to: `degree / (n - 1)`.
/// Directed graphs count in- and out-edges. A lone node scores 1.
pub fn degree_centrality(graph: &Graph) -> CentralityScores {
    let n = graph.node_count();
    if n <= 1 {
        return graph.nodes().map(|node| (node, 1.0)).collect();
    }

    let scale = 1.0 / (n - 1) as f64;
    graph
        .nodes()
        .map(|node| (node, graph.degree(node) as f64 * scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphMode;

    #[test]
    fn path_graph_degrees() {
        let g = Graph::from_edges(GraphMode::default(), vec![(0, 1, 1.0), (1, 2, 1.0)]);
        let scores = degree_centrality(&g);
        assert_eq!(scores[&0], 0.5);
        assert_eq!(scores[&1], 1.0);
        assert_eq!(scores[&2], 0.5);
    }

    #[test]
    fn directed_degree_sums_in_and_out() {
        let g = Graph::from_edges(
            GraphMode::new(true, false),
            vec![(0, 1, 1.0), (1, 0, 1.0), (2, 1, 1.0)],
        );
        let scores = degree_centrality(&g);
        assert_eq!(scores[&1], 1.5);
        assert_eq!(scores[&2], 0.5);
    }
}
