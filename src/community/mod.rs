//! Community detection module

pub mod girvan_newman;
pub mod modularity;

use crate::graph::{Graph, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use girvan_newman::{GirvanNewman, IterationOutcome};
pub use modularity::modularity;

/// Ordered communities; each community is sorted ascending
pub type Partition = Vec<Vec<NodeId>>;

/// One row of the modularity log
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModularityRecord {
    /// 1-based Girvan-Newman iteration
    pub iteration: usize,

    /// Number of communities in the partition
    pub community_count: usize,

    /// Modularity against the unmutated graph
    pub modularity: f64,
}

/// Best partition seen so far, persisted every time it improves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub iteration: usize,
    pub modularity: f64,
    pub communities: Partition,
}

/// Summary of a complete detection run
#[derive(Debug, Clone)]
pub struct CommunityRun {
    /// `None` when the input had no edges to remove
    pub best: Option<PartitionSnapshot>,

    /// One record per iteration, in order
    pub history: Vec<ModularityRecord>,
}

/// True when every node of `graph` appears in exactly one community and
/// no community mentions a node outside the graph
pub fn is_partition_of(partition: &Partition, graph: &Graph) -> bool {
    let mut seen = HashSet::with_capacity(graph.node_count());
    for node in partition.iter().flatten() {
        if !graph.contains_node(*node) || !seen.insert(*node) {
            return false;
        }
    }
    seen.len() == graph.node_count()
}
