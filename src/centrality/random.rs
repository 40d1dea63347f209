//! Randomised removal orders

use crate::centrality::{
    compare_scores, degree_centrality, seeded_rng, CentralityScores, NodeOrder, RankingStrategy,
};
use crate::config::SamplingMode;
use crate::error::AnalysisError;
use crate::graph::{Graph, NodeId};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Uniformly random permutation of the node set
pub struct UniformRandom {
    rng: StdRng,
}

impl UniformRandom {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seeded_rng(seed),
        }
    }
}

impl RankingStrategy for UniformRandom {
    fn name(&self) -> &str {
        "random"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        let mut nodes: NodeOrder = graph.nodes().collect();
        nodes.shuffle(&mut self.rng);
        Ok(nodes)
    }
}

/// Rank-weighted random draw ("curious" attacker).
///
/// Nodes are sorted ascending by centrality and given linearly decreasing
/// weights from 1.0 down to 0.1, so peripheral nodes are the likeliest
/// picks. The draw has length `n`. With [`SamplingMode::WithReplacement`]
/// the order may repeat nodes; the simulator skips repeats.
pub struct CuriousRanking {
    scores: Option<CentralityScores>,
    sampling: SamplingMode,
    rng: StdRng,
}

impl CuriousRanking {
    /// `scores` defaults to the graph's degree centrality when absent
    pub fn new(scores: Option<CentralityScores>, sampling: SamplingMode, seed: Option<u64>) -> Self {
        Self {
            scores,
            sampling,
            rng: seeded_rng(seed),
        }
    }
}

/// `count` evenly spaced values from 1.0 down to 0.1, summing to 1
pub fn rank_weights(count: usize) -> Vec<f64> {
    let raw: Vec<f64> = match count {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..count)
            .map(|i| 1.0 - 0.9 * i as f64 / (count - 1) as f64)
            .collect(),
    };
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

impl RankingStrategy for CuriousRanking {
    fn name(&self) -> &str {
        "curious"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        let scores = match &self.scores {
            Some(scores) => scores.clone(),
            None => degree_centrality(graph),
        };

        let mut ranked: Vec<(NodeId, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| compare_scores(a.1, b.1));
        let nodes: Vec<NodeId> = ranked.into_iter().map(|(n, _)| n).collect();
        let weights = rank_weights(nodes.len());

        if nodes.is_empty() {
            return Ok(NodeOrder::new());
        }

        let order = match self.sampling {
            SamplingMode::WithReplacement => {
                let sampler = WeightedIndex::new(&weights).map_err(|e| {
                    AnalysisError::DegenerateGraph(format!("invalid sampling weights: {}", e))
                })?;
                (0..nodes.len())
                    .map(|_| nodes[sampler.sample(&mut self.rng)])
                    .collect()
            }
            SamplingMode::WithoutReplacement => {
                // Weighted permutation: sort by u^(1/w) descending
                let mut keyed: Vec<(f64, NodeId)> = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&n, &w)| (self.rng.gen::<f64>().powf(1.0 / w), n))
                    .collect();
                keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
                keyed.into_iter().map(|(_, n)| n).collect()
            }
        };
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphMode;
    use std::collections::HashSet;

    fn ring(n: u64) -> Graph {
        Graph::from_edges(GraphMode::default(), (0..n).map(|i| (i, (i + 1) % n, 1.0)))
    }

    #[test]
    fn rank_weights_are_linear_and_normalised() {
        let w = rank_weights(4);
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((w[0] / w[3] - 10.0).abs() < 1e-9);
        assert_eq!(rank_weights(1), vec![1.0]);
        assert!(rank_weights(0).is_empty());
    }

    #[test]
    fn uniform_random_is_a_seeded_permutation() {
        let g = ring(50);
        let a = UniformRandom::new(Some(7)).node_order(&g).unwrap();
        let b = UniformRandom::new(Some(7)).node_order(&g).unwrap();
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn curious_with_replacement_is_seeded_and_full_length() {
        let g = ring(40);
        let mut first = CuriousRanking::new(None, SamplingMode::WithReplacement, Some(11));
        let mut second = CuriousRanking::new(None, SamplingMode::WithReplacement, Some(11));
        let a = first.node_order(&g).unwrap();
        assert_eq!(a.len(), 40);
        assert_eq!(a, second.node_order(&g).unwrap());
        assert!(a.iter().all(|n| g.contains_node(*n)));
    }

    #[test]
    fn curious_without_replacement_is_a_permutation() {
        let g = ring(30);
        let order = CuriousRanking::new(None, SamplingMode::WithoutReplacement, Some(3))
            .node_order(&g)
            .unwrap();
        let distinct: HashSet<_> = order.iter().collect();
        assert_eq!(order.len(), 30);
        assert_eq!(distinct.len(), 30);
    }

    #[test]
    fn curious_prefers_low_centrality_nodes() {
        let scores: CentralityScores = [(1, 0.0), (2, 100.0)].into_iter().collect();
        let g = Graph::from_edges(GraphMode::default(), vec![(1, 2, 1.0)]);
        let mut strategy = CuriousRanking::new(Some(scores), SamplingMode::WithReplacement, Some(5));
        let mut low = 0;
        for _ in 0..200 {
            low += strategy
                .node_order(&g)
                .unwrap()
                .iter()
                .filter(|&&n| n == 1)
                .count();
        }
        // Expected share 1.0 / 1.1 of 400 draws
        assert!(low > 300, "low-centrality draws: {}", low);
    }
}
