//! Sequential network dismantling
//!
//! Nodes are removed one at a time in a given order. After every removal
//! the giant-component fraction and the global efficiency of what is left
//! are recorded. The run stops at the first step that leaves the graph
//! without nodes or without edges, emitting a single `(0, 0)` point.

use crate::centrality::{NodeOrder, RankingStrategy};
use crate::error::AnalysisError;
use crate::graph::algorithms::{giant_fraction, global_efficiency};
use crate::graph::{Graph, NodeId};
use crate::progress::Progress;
use crate::storage::MetricsRecorder;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// State of the graph after one removal step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// Largest component size over remaining node count, in [0, 1]
    pub giant_fraction: f64,

    /// Mean reciprocal distance over node pairs
    pub global_efficiency: f64,
}

impl TracePoint {
    /// Point emitted when the graph runs out of nodes or edges
    pub const COLLAPSED: TracePoint = TracePoint {
        giant_fraction: 0.0,
        global_efficiency: 0.0,
    };
}

pub type RobustnessTrace = Vec<TracePoint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Terminated,
}

/// Owns a private copy of the graph and consumes a [`NodeOrder`]
pub struct RobustnessSimulator {
    graph: Graph,
    order: NodeOrder,
    cursor: usize,
    visited: HashSet<NodeId>,
    trace: RobustnessTrace,
    state: SimulationState,
}

impl RobustnessSimulator {
    pub fn new(graph: &Graph, order: NodeOrder) -> Self {
        let state = if order.is_empty() {
            SimulationState::Terminated
        } else {
            SimulationState::Running
        };
        Self {
            graph: graph.clone(),
            visited: HashSet::with_capacity(order.len()),
            order,
            cursor: 0,
            trace: RobustnessTrace::new(),
            state,
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Graph as mutated so far
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn trace(&self) -> &RobustnessTrace {
        &self.trace
    }

    /// Order entries consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Distinct nodes actually removed
    pub fn removed(&self) -> usize {
        self.visited.len()
    }

    /// Consume the next order entry. Returns the appended point, or `None`
    /// once the simulation has terminated.
    pub fn step(&mut self) -> Option<TracePoint> {
        if self.state == SimulationState::Terminated {
            return None;
        }

        let node = self.order[self.cursor];
        self.cursor += 1;

        // Absent or repeated ids leave the graph untouched
        if self.graph.contains_node(node) && self.visited.insert(node) {
            self.graph.remove_node(node);
        }

        let point = if self.graph.node_count() == 0 || self.graph.edge_count() == 0 {
            self.state = SimulationState::Terminated;
            TracePoint::COLLAPSED
        } else {
            if self.cursor == self.order.len() {
                self.state = SimulationState::Terminated;
            }
            TracePoint {
                giant_fraction: giant_fraction(&self.graph),
                global_efficiency: efficiency_or_zero(&self.graph),
            }
        };

        self.trace.push(point);
        Some(point)
    }

    /// Drive the simulation to termination
    pub fn run(mut self, progress: &dyn Progress) -> RobustnessTrace {
        let total = self.order.len();
        while self.step().is_some() {
            progress.step(self.cursor - 1, total);
        }
        log::debug!(
            "Simulation stopped after {} of {} entries ({} distinct removals)",
            self.cursor,
            total,
            self.visited.len()
        );
        self.trace
    }
}

/// Global efficiency with failures absorbed as 0
fn efficiency_or_zero(graph: &Graph) -> f64 {
    soft_efficiency(global_efficiency(&graph.compress()))
}

fn soft_efficiency(result: Result<f64, AnalysisError>) -> f64 {
    match result {
        Ok(efficiency) => efficiency,
        Err(err) => {
            log::debug!("Global efficiency unavailable, using 0: {}", err);
            0.0
        }
    }
}

/// Simulate removing `order` from a copy of `graph`
pub fn simulate(graph: &Graph, order: NodeOrder, progress: &dyn Progress) -> RobustnessTrace {
    RobustnessSimulator::new(graph, order).run(progress)
}

/// Simulate each strategy on its own copy of `graph` and record its trace.
///
/// A ranking that fails to converge abandons only that strategy; any other
/// error aborts the run. Returns the names of the abandoned strategies.
pub fn run_strategies(
    graph: &Graph,
    strategies: &mut [Box<dyn RankingStrategy>],
    recorder: &mut dyn MetricsRecorder,
    progress: &dyn Progress,
) -> anyhow::Result<Vec<String>> {
    let mut abandoned = Vec::new();
    for strategy in strategies.iter_mut() {
        log::info!("Ranking nodes with the {} strategy", strategy.name());

        let order = match strategy.node_order(graph) {
            Ok(order) => order,
            Err(err) if err.is_convergence_failure() => {
                log::error!("Abandoning {} strategy: {}", strategy.name(), err);
                abandoned.push(strategy.name().to_string());
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let trace = simulate(graph, order, progress);
        recorder.record_trace(strategy.name(), &trace)?;
    }
    Ok(abandoned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphMode;
    use crate::progress::Silent;

    fn undirected(edges: &[(NodeId, NodeId)]) -> Graph {
        Graph::from_edges(GraphMode::default(), edges.iter().map(|&(u, v)| (u, v, 1.0)))
    }

    #[test]
    fn star_collapses_after_hub_removal() {
        let star = undirected(&[(0, 1), (0, 2), (0, 3), (0, 4)]);
        let mut sim = RobustnessSimulator::new(&star, vec![0, 1, 2, 3, 4]);
        assert_eq!(sim.step(), Some(TracePoint::COLLAPSED));
        assert_eq!(sim.state(), SimulationState::Terminated);
        assert_eq!(sim.step(), None);
        assert_eq!(sim.consumed(), 1);
        assert_eq!(sim.graph().node_count(), 4);
        // the caller's graph is untouched
        assert_eq!(star.node_count(), 5);
    }

    #[test]
    fn path_removal_records_fraction_and_efficiency() {
        // 0-1-2-3, remove an end: 1-2-3 remains connected
        let g = undirected(&[(0, 1), (1, 2), (2, 3)]);
        let trace = simulate(&g, vec![0, 3, 1], &Silent);
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0].giant_fraction, 1.0);
        assert!((trace[0].global_efficiency - (4.0 + 1.0) / 6.0).abs() < 1e-12);
        assert_eq!(trace[1].giant_fraction, 1.0);
        assert!((trace[1].global_efficiency - 1.0).abs() < 1e-12);
        assert_eq!(trace[2], TracePoint::COLLAPSED);
    }

    #[test]
    fn duplicates_and_unknown_ids_are_no_ops() {
        let g = undirected(&[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)]);
        let mut sim = RobustnessSimulator::new(&g, vec![99, 1, 1, 99]);
        let first = sim.step().unwrap();
        assert_eq!(first.giant_fraction, 1.0);
        sim.step();
        let repeat = sim.step().unwrap();
        let unknown = sim.step().unwrap();
        assert_eq!(sim.removed(), 1);
        assert_eq!(repeat, unknown);
        assert_eq!(sim.graph().node_count(), 3);
        assert_eq!(sim.state(), SimulationState::Terminated);
    }

    #[test]
    fn giant_fraction_stays_in_unit_interval() {
        let g = undirected(&[(0, 1), (1, 2), (3, 4), (4, 5), (5, 6), (2, 7), (8, 9)]);
        let trace = simulate(&g, (0..10).collect(), &Silent);
        for point in &trace {
            assert!((0.0..=1.0).contains(&point.giant_fraction));
            assert!(point.global_efficiency >= 0.0);
        }
        assert_eq!(trace.last(), Some(&TracePoint::COLLAPSED));
    }

    #[test]
    fn directed_graphs_use_strong_components() {
        // 0 <-> 1 -> 2 <-> 3; remove an unrelated isolated id first
        let mut g = Graph::from_edges(
            GraphMode::new(true, false),
            vec![(0, 1, 1.0), (1, 0, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 2, 1.0)],
        );
        g.add_node(9);
        let trace = simulate(&g, vec![9], &Silent);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].giant_fraction, 0.5);
    }

    #[test]
    fn efficiency_failure_is_recorded_as_zero() {
        let err = AnalysisError::DegenerateGraph("efficiency is NaN".to_string());
        assert_eq!(soft_efficiency(Err(err)), 0.0);
        assert_eq!(soft_efficiency(Ok(0.75)), 0.75);
    }

    #[test]
    fn non_converging_strategy_is_skipped_and_the_rest_recorded() {
        use crate::centrality::{DegreeRanking, EigenvectorRanking};
        use crate::config::IterationLimits;
        use crate::storage::MemoryRecorder;

        let g = undirected(&[(0, 1), (0, 2), (0, 3), (1, 2), (3, 4)]);
        let limits = IterationLimits { max_iterations: 1, tolerance: 1e-12 };
        let mut strategies: Vec<Box<dyn RankingStrategy>> =
            vec![Box::new(EigenvectorRanking { limits }), Box::new(DegreeRanking)];
        let mut recorder = MemoryRecorder::default();

        let abandoned = run_strategies(&g, &mut strategies, &mut recorder, &Silent).unwrap();
        assert_eq!(abandoned, vec!["eigenvector".to_string()]);
        assert_eq!(recorder.traces.len(), 1);
        assert_eq!(recorder.traces[0].0, "degree");
    }

    #[test]
    fn empty_order_yields_empty_trace() {
        let g = undirected(&[(0, 1)]);
        assert!(simulate(&g, Vec::new(), &Silent).is_empty());
    }
}
