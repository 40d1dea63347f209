//! Node ranking strategies that drive the dismantling simulation

pub mod betweenness;
pub mod degree;
pub mod random;
pub mod spectral;

use crate::config::Config;
use crate::data::centrality_table::load_centrality_table;
use crate::error::AnalysisError;
use crate::graph::{Graph, NodeId};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

pub use betweenness::{betweenness_centrality, edge_betweenness, EdgeKey};
pub use degree::degree_centrality;
pub use random::{CuriousRanking, UniformRandom};
pub use spectral::{eigenvector_centrality, pagerank};

/// Score per node, iterated in ascending node id
pub type CentralityScores = BTreeMap<NodeId, f64>;

/// Removal order consumed left to right by the simulator
pub type NodeOrder = Vec<NodeId>;

/// A pluggable way of turning a graph into a removal order
pub trait RankingStrategy {
    /// Short label used in logs and output file names
    fn name(&self) -> &str;

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError>;
}

/// Total order on scores with NaN ranked below every number
pub fn compare_scores(a: f64, b: f64) -> Ordering {
    let key = |s: f64| if s.is_nan() { f64::NEG_INFINITY } else { s };
    key(a).total_cmp(&key(b))
}

/// Sort nodes by score, highest first. The sort is stable, so tied nodes
/// keep ascending id order.
pub fn rank_descending(scores: &CentralityScores) -> NodeOrder {
    scores
        .iter()
        .sorted_by(|a, b| compare_scores(*b.1, *a.1))
        .map(|(&n, _)| n)
        .collect()
}

/// Seeded generator, or one drawn from OS entropy when no seed is given
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Degree centrality, highest first
#[derive(Debug, Default)]
pub struct DegreeRanking;

impl RankingStrategy for DegreeRanking {
    fn name(&self) -> &str {
        "degree"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        Ok(rank_descending(&degree_centrality(graph)))
    }
}

/// Node betweenness, highest first
#[derive(Debug, Default)]
pub struct BetweennessRanking;

impl RankingStrategy for BetweennessRanking {
    fn name(&self) -> &str {
        "betweenness"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        Ok(rank_descending(&betweenness_centrality(&graph.compress())))
    }
}

/// Eigenvector centrality, highest first
#[derive(Debug)]
pub struct EigenvectorRanking {
    pub limits: crate::config::IterationLimits,
}

impl RankingStrategy for EigenvectorRanking {
    fn name(&self) -> &str {
        "eigenvector"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        let scores = eigenvector_centrality(&graph.compress(), self.limits)?;
        Ok(rank_descending(&scores))
    }
}

/// PageRank, highest first
#[derive(Debug)]
pub struct PageRankRanking {
    pub damping: f64,
    pub limits: crate::config::IterationLimits,
}

impl RankingStrategy for PageRankRanking {
    fn name(&self) -> &str {
        "pagerank"
    }

    fn node_order(&mut self, graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        let scores = pagerank(&graph.compress(), self.damping, self.limits)?;
        Ok(rank_descending(&scores))
    }
}

/// Precomputed table score, highest first
#[derive(Debug)]
pub struct TableRanking {
    pub scores: CentralityScores,
}

impl RankingStrategy for TableRanking {
    fn name(&self) -> &str {
        "table"
    }

    fn node_order(&mut self, _graph: &Graph) -> Result<NodeOrder, AnalysisError> {
        Ok(rank_descending(&self.scores))
    }
}

/// Strategy selector used by the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyKind {
    Degree,
    Betweenness,
    Eigenvector,
    Pagerank,
    Random,
    /// Order by a precomputed centrality table
    Table,
    /// Rank-weighted random draw favouring low-centrality nodes
    Curious,
}

impl StrategyKind {
    /// Instantiate the strategy. `table` feeds `Table` (required) and
    /// `Curious` (optional, degree centrality otherwise).
    pub fn build(
        self,
        config: &Config,
        table: Option<&CentralityScores>,
    ) -> anyhow::Result<Box<dyn RankingStrategy>> {
        let strategy: Box<dyn RankingStrategy> = match self {
            StrategyKind::Degree => Box::new(DegreeRanking),
            StrategyKind::Betweenness => Box::new(BetweennessRanking),
            StrategyKind::Eigenvector => Box::new(EigenvectorRanking {
                limits: config.limits,
            }),
            StrategyKind::Pagerank => Box::new(PageRankRanking {
                damping: config.damping,
                limits: config.limits,
            }),
            StrategyKind::Random => Box::new(UniformRandom::new(config.seed)),
            StrategyKind::Table => {
                let scores = table
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("the table strategy needs --table and --column"))?;
                Box::new(TableRanking { scores })
            }
            StrategyKind::Curious => Box::new(CuriousRanking::new(
                table.cloned(),
                config.sampling,
                config.seed,
            )),
        };
        Ok(strategy)
    }
}

/// Load the optional score table and instantiate every requested strategy.
///
/// Runs before the graph is read, so a missing table file or a strategy
/// that lacks its inputs aborts before any simulation.
pub fn build_strategies(
    kinds: &[StrategyKind],
    config: &Config,
    table: Option<(&Path, &str)>,
) -> anyhow::Result<Vec<Box<dyn RankingStrategy>>> {
    let scores = match table {
        Some((path, column)) => Some(load_centrality_table(path, column)?),
        None => None,
    };
    kinds
        .iter()
        .map(|kind| kind.build(config, scores.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphMode;

    fn star() -> Graph {
        Graph::from_edges(
            GraphMode::default(),
            (1..=4).map(|leaf| (0, leaf, 1.0)),
        )
    }

    #[test]
    fn degree_ranks_hub_first_then_leaves_by_id() {
        let order = DegreeRanking.node_order(&star()).unwrap();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn every_deterministic_strategy_ranks_the_hub_first() {
        let config = Config::default();
        for kind in [
            StrategyKind::Degree,
            StrategyKind::Betweenness,
            StrategyKind::Eigenvector,
            StrategyKind::Pagerank,
        ] {
            let mut strategy = kind.build(&config, None).unwrap();
            let order = strategy.node_order(&star()).unwrap();
            assert_eq!(order.len(), 5, "{}", strategy.name());
            assert_eq!(order[0], 0, "{}", strategy.name());
        }
    }

    #[test]
    fn table_strategy_requires_scores() {
        assert!(StrategyKind::Table.build(&Config::default(), None).is_err());

        let scores: CentralityScores = [(7, 0.1), (3, 0.9), (5, 0.1)].into_iter().collect();
        let mut strategy = StrategyKind::Table
            .build(&Config::default(), Some(&scores))
            .unwrap();
        assert_eq!(strategy.node_order(&star()).unwrap(), vec![3, 5, 7]);
    }

    #[test]
    fn strategy_setup_fails_before_any_ranking() {
        let config = Config::default();
        let err = build_strategies(&[StrategyKind::Degree, StrategyKind::Table], &config, None)
            .err()
            .unwrap();
        assert!(err.to_string().contains("table strategy"));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("centralities.csv");
        let err = build_strategies(&[StrategyKind::Degree], &config, Some((missing.as_path(), "degree")))
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::InputNotFound(p)) if p == &missing
        ));

        let built = build_strategies(&[StrategyKind::Degree, StrategyKind::Random], &config, None)
            .unwrap();
        let names: Vec<&str> = built.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["degree", "random"]);
    }

    #[test]
    fn nan_scores_rank_last_in_id_order() {
        let scores: CentralityScores =
            [(1, f64::NAN), (2, 0.5), (3, f64::NAN), (4, 0.75), (5, -1.0)].into_iter().collect();
        assert_eq!(rank_descending(&scores), vec![4, 2, 5, 1, 3]);
    }
}
