//! Dataset preparation before analysis

use crate::config::Preprocessing;
use crate::graph::algorithms::largest_component_subgraph;
use crate::graph::Graph;

/// Apply the configured preparation stages in order: giant component
/// extraction, undirected conversion, weight removal.
pub fn prepare(graph: Graph, stages: Preprocessing) -> Graph {
    log::info!(
        "Preparing graph ({} nodes, {} edges, directed: {}, weighted: {})",
        graph.node_count(),
        graph.edge_count(),
        graph.is_directed(),
        graph.is_weighted()
    );

    let mut graph = if stages.largest_component {
        largest_component_subgraph(&graph)
    } else {
        graph
    };

    if stages.to_undirected && graph.is_directed() {
        graph = graph.to_undirected();
        log::info!("Converted to undirected: {} edges", graph.edge_count());
    }

    if stages.drop_weights && graph.is_weighted() {
        graph.drop_weights();
        log::debug!("Dropped edge weights");
    }

    log::info!(
        "Prepared graph has {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    graph
}
