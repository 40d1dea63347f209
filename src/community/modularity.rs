//! Newman modularity of a partition

use crate::community::Partition;
use crate::graph::{Graph, NodeId};
use std::collections::HashMap;

/// Modularity of `partition` on `graph` with unit edge weights.
///
/// Undirected: `Q = sum_c [ L_c / m - resolution * (d_c / 2m)^2 ]` where
/// `L_c` counts intra-community edges and `d_c` sums degrees (self-loops
/// count twice). Directed graphs use out- and in-degree sums over `m^2`.
/// Nodes missing from the partition contribute nothing. An edgeless graph
/// scores 0.
pub fn modularity(graph: &Graph, partition: &Partition, resolution: f64) -> f64 {
    let m = graph.edge_count() as f64;
    if m == 0.0 {
        return 0.0;
    }

    let community_of: HashMap<NodeId, usize> = partition
        .iter()
        .enumerate()
        .flat_map(|(c, members)| members.iter().map(move |&n| (n, c)))
        .collect();

    let mut internal = vec![0.0f64; partition.len()];
    for (src, dst, _) in graph.edges() {
        match (community_of.get(&src), community_of.get(&dst)) {
            (Some(a), Some(b)) if a == b => internal[*a] += 1.0,
            _ => {}
        }
    }

    partition
        .iter()
        .zip(internal)
        .map(|(members, l_c)| {
            let expected = if graph.is_directed() {
                let out_sum: usize = members.iter().map(|&n| graph.neighbors(n).count()).sum();
                let in_sum: usize = members.iter().map(|&n| graph.predecessors(n).count()).sum();
                out_sum as f64 * in_sum as f64 / (m * m)
            } else {
                let degree_sum: usize = members.iter().map(|&n| graph.degree(n)).sum();
                (degree_sum as f64 / (2.0 * m)).powi(2)
            };
            l_c / m - resolution * expected
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphMode;

    fn undirected(edges: &[(NodeId, NodeId)]) -> Graph {
        Graph::from_edges(GraphMode::default(), edges.iter().map(|&(u, v)| (u, v, 1.0)))
    }

    #[test]
    fn two_triangles_split_at_the_bridge() {
        let g = undirected(&[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)]);
        let q = modularity(&g, &vec![vec![0, 1, 2], vec![3, 4, 5]], 1.0);
        // each side: L_c = 3, d_c = 7, m = 7
        let expected = 2.0 * (3.0 / 7.0 - (7.0f64 / 14.0).powi(2));
        assert!((q - expected).abs() < 1e-12);
    }

    #[test]
    fn single_community_scores_zero() {
        let g = undirected(&[(0, 1), (1, 2), (2, 0)]);
        assert!(modularity(&g, &vec![vec![0, 1, 2]], 1.0).abs() < 1e-12);
    }

    #[test]
    fn singletons_score_negative() {
        let g = undirected(&[(0, 1), (1, 2), (2, 0)]);
        let q = modularity(&g, &vec![vec![0], vec![1], vec![2]], 1.0);
        assert!((q + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn edgeless_graph_scores_zero() {
        let mut g = undirected(&[]);
        g.add_node(1);
        assert_eq!(modularity(&g, &vec![vec![1]], 1.0), 0.0);
    }
}
