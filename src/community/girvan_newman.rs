//! Girvan-Newman divisive community detection
//!
//! Every iteration removes maximum-betweenness edges, recomputing edge
//! betweenness after each removal, until the number of connected
//! components grows. The resulting components form the next partition,
//! which is scored against the graph as it was before any removal.

use crate::centrality::{edge_betweenness, EdgeKey};
use crate::community::{modularity, CommunityRun, ModularityRecord, Partition, PartitionSnapshot};
use crate::graph::algorithms::{connected_components, number_connected_components};
use crate::graph::Graph;
use crate::progress::Progress;
use crate::storage::MetricsRecorder;
use anyhow::Result;
use std::collections::BTreeMap;

/// Relative slack under which two betweenness values count as tied
const TIE_TOLERANCE: f64 = 1e-12;

/// Result of a single iteration
#[derive(Debug, Clone)]
pub struct IterationOutcome {
    pub record: ModularityRecord,
    pub partition: Partition,

    /// Set when this partition beat every earlier one
    pub new_best: Option<PartitionSnapshot>,
}

/// Detector state: an untouched reference graph, a working copy that loses
/// edges, and the best partition found so far
pub struct GirvanNewman {
    reference: Graph,
    working: Graph,
    resolution: f64,
    iteration: usize,
    best: Option<PartitionSnapshot>,
    history: Vec<ModularityRecord>,
    last_removed: Vec<EdgeKey>,
}

/// Highest-betweenness edge; ties go to the smallest key
pub fn most_valuable_edge(betweenness: &BTreeMap<EdgeKey, f64>) -> Option<EdgeKey> {
    let max = betweenness.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let threshold = max - max.abs() * TIE_TOLERANCE;
    betweenness
        .iter()
        .find(|(_, &value)| value >= threshold)
        .map(|(&key, _)| key)
}

impl GirvanNewman {
    /// Start from a private copy of `graph`. Directed input is converted to
    /// undirected and weights are dropped; self-loops are removed from the
    /// working copy only.
    pub fn new(graph: &Graph, resolution: f64) -> Self {
        let mut reference = if graph.is_directed() {
            graph.to_undirected()
        } else {
            graph.clone()
        };
        reference.drop_weights();

        let mut working = reference.clone();
        let loops = working.remove_self_loops();
        if loops > 0 {
            log::debug!("Removed {} self-loops before detection", loops);
        }

        Self {
            reference,
            working,
            resolution,
            iteration: 0,
            best: None,
            history: Vec::new(),
            last_removed: Vec::new(),
        }
    }

    /// All nodes are singleton communities
    pub fn is_terminal(&self) -> bool {
        self.working.edge_count() == 0
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn best(&self) -> Option<&PartitionSnapshot> {
        self.best.as_ref()
    }

    /// Edges removed by the most recent split, in removal order
    pub fn last_removed(&self) -> &[EdgeKey] {
        &self.last_removed
    }

    /// The graph partitions are scored against
    pub fn reference(&self) -> &Graph {
        &self.reference
    }

    /// Remove edges until the component count strictly increases and
    /// return the new components. `None` once terminal.
    pub fn split(&mut self) -> Option<Partition> {
        if self.is_terminal() {
            return None;
        }

        self.last_removed.clear();
        let before = number_connected_components(&self.working);

        loop {
            let betweenness = edge_betweenness(&self.working.compress());
            let Some((u, v)) = most_valuable_edge(&betweenness) else {
                break;
            };
            self.working.remove_edge(u, v);
            self.last_removed.push((u, v));

            if number_connected_components(&self.working) > before {
                break;
            }
        }

        Some(connected_components(&self.working))
    }

    /// Run one iteration: split, score, update the best partition
    pub fn step(&mut self, progress: &dyn Progress) -> Option<IterationOutcome> {
        if self.is_terminal() {
            return None;
        }

        self.iteration += 1;
        progress.iteration_started(self.iteration);

        let partition = self.split()?;
        let score = modularity(&self.reference, &partition, self.resolution);
        let record = ModularityRecord {
            iteration: self.iteration,
            community_count: partition.len(),
            modularity: score,
        };
        self.history.push(record);
        progress.partition_found(record.iteration, record.community_count, score);

        let improved = self.best.as_ref().map_or(true, |best| score > best.modularity);
        let new_best = if improved {
            let snapshot = PartitionSnapshot {
                iteration: self.iteration,
                modularity: score,
                communities: partition.clone(),
            };
            self.best = Some(snapshot.clone());
            progress.new_best(self.iteration, score);
            Some(snapshot)
        } else {
            None
        };

        Some(IterationOutcome {
            record,
            partition,
            new_best,
        })
    }

    /// Iterate until every node is a singleton, streaming records into
    /// `recorder`
    pub fn run(
        mut self,
        recorder: &mut dyn MetricsRecorder,
        progress: &dyn Progress,
    ) -> Result<CommunityRun> {
        log::info!(
            "Running Girvan-Newman on {} nodes and {} edges",
            self.reference.node_count(),
            self.working.edge_count()
        );
        recorder.begin_modularity_log()?;

        while let Some(outcome) = self.step(progress) {
            recorder.record_iteration(&outcome.record)?;
            if let Some(snapshot) = &outcome.new_best {
                recorder.record_best_partition(snapshot)?;
            }
            if outcome.record.community_count == self.reference.node_count() {
                break;
            }
        }

        match &self.best {
            Some(best) => log::info!(
                "Best partition at iteration {} with modularity {:.4} ({} communities)",
                best.iteration,
                best.modularity,
                best.communities.len()
            ),
            None => log::warn!("Graph has no edges; nothing to partition"),
        }

        Ok(CommunityRun {
            best: self.best,
            history: self.history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::is_partition_of;
    use crate::config::GraphMode;
    use crate::graph::NodeId;
    use crate::progress::Silent;
    use crate::storage::MemoryRecorder;

    fn undirected(edges: &[(NodeId, NodeId)]) -> Graph {
        Graph::from_edges(GraphMode::default(), edges.iter().map(|&(u, v)| (u, v, 1.0)))
    }

    fn two_triangles() -> Graph {
        undirected(&[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (3, 5)])
    }

    #[test]
    fn cycle_needs_two_removals_to_split() {
        let mut gn = GirvanNewman::new(&undirected(&[(0, 1), (1, 2), (2, 3), (3, 0)]), 1.0);
        let partition = gn.split().unwrap();
        assert_eq!(gn.last_removed().len(), 2);
        assert_eq!(partition.len(), 2);
        assert!(partition.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn first_split_cuts_the_bridge() {
        let mut gn = GirvanNewman::new(&two_triangles(), 1.0);
        let outcome = gn.step(&Silent).unwrap();
        assert_eq!(gn.last_removed(), &[(2, 3)]);
        assert_eq!(outcome.partition, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert!(outcome.new_best.is_some());
        let expected = 2.0 * (3.0 / 7.0 - 0.25);
        assert!((outcome.record.modularity - expected).abs() < 1e-12);
    }

    #[test]
    fn run_ends_with_singletons_and_keeps_invariants() {
        let graph = two_triangles();
        let mut recorder = MemoryRecorder::default();
        let run = GirvanNewman::new(&graph, 1.0)
            .run(&mut recorder, &Silent)
            .unwrap();

        let counts: Vec<usize> = run.history.iter().map(|r| r.community_count).collect();
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*counts.last().unwrap(), graph.node_count());
        assert_eq!(recorder.iterations, run.history);
        assert_eq!(recorder.log_starts, 1);

        let best = run.best.unwrap();
        assert_eq!(best.iteration, 1);
        assert!(is_partition_of(&best.communities, &graph));

        // snapshots are emitted exactly on strict improvements
        let mods: Vec<f64> = recorder.snapshots.iter().map(|s| s.modularity).collect();
        assert!(mods.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(recorder.snapshots.last(), Some(&best));
    }

    #[test]
    fn edgeless_graph_is_already_terminal() {
        let mut graph = undirected(&[]);
        graph.add_node(1);
        graph.add_node(2);
        let mut recorder = MemoryRecorder::default();
        let run = GirvanNewman::new(&graph, 1.0).run(&mut recorder, &Silent).unwrap();
        assert!(run.best.is_none());
        assert!(run.history.is_empty());
    }

    #[test]
    fn self_loops_do_not_stall_detection() {
        let graph = undirected(&[(0, 0), (0, 1), (1, 2)]);
        let mut gn = GirvanNewman::new(&graph, 1.0);
        let mut steps = 0;
        while gn.step(&Silent).is_some() {
            steps += 1;
        }
        assert_eq!(steps, 2);
        assert!(gn.is_terminal());
        assert_eq!(gn.reference().edge_count(), 3);
    }

    #[test]
    fn ties_pick_the_smallest_edge() {
        let eb: BTreeMap<EdgeKey, f64> =
            [((2, 3), 0.5), ((0, 1), 0.5), ((1, 2), 0.25)].into_iter().collect();
        assert_eq!(most_valuable_edge(&eb), Some((0, 1)));
        assert_eq!(most_valuable_edge(&BTreeMap::new()), None);
    }
}
