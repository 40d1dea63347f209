//! Graph construction module

use crate::config::GraphMode;
use crate::graph::{Graph, NodeId};

/// One parsed edge-list row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: Option<f64>,
}

/// Builder for incrementally constructing a [`Graph`]
pub struct GraphBuilder {
    /// Edge interpretation
    mode: GraphMode,

    /// Rows in input order
    records: Vec<EdgeRecord>,

    /// Rows whose weight was missing in weighted mode
    defaulted_weights: usize,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(mode: GraphMode, capacity: usize) -> Self {
        Self {
            mode,
            records: Vec::with_capacity(capacity),
            defaulted_weights: 0,
        }
    }

    /// Add an edge from one node to another
    pub fn add_edge(&mut self, record: EdgeRecord) {
        if self.mode.weighted && record.weight.is_none() {
            self.defaulted_weights += 1;
        }
        self.records.push(record);
    }

    /// Build the graph
    pub fn build(self) -> Graph {
        if self.defaulted_weights > 0 {
            log::warn!(
                "{} weighted rows had no weight column; using 1.0",
                self.defaulted_weights
            );
        }

        let graph = Graph::from_edges(
            self.mode,
            self.records
                .into_iter()
                .map(|r| (r.source, r.target, r.weight.unwrap_or(1.0))),
        );

        log::debug!(
            "Built graph with {} nodes and {} edges (directed: {}, weighted: {})",
            graph.node_count(),
            graph.edge_count(),
            graph.is_directed(),
            graph.is_weighted()
        );
        graph
    }
}
