//! Power-iteration centralities: eigenvector and PageRank
//!
//! Both pull scores along incoming edges, one node per rayon task. Each
//! node's sum runs sequentially over its sorted in-neighbours, so results
//! are reproducible regardless of the pool size.

use crate::centrality::CentralityScores;
use crate::config::IterationLimits;
use crate::error::AnalysisError;
use crate::graph::CompressedGraph;
use rayon::prelude::*;

fn l1_change(current: &[f64], previous: &[f64]) -> f64 {
    current
        .iter()
        .zip(previous)
        .map(|(a, b)| (a - b).abs())
        .sum()
}

fn into_scores(graph: &CompressedGraph, values: Vec<f64>) -> CentralityScores {
    graph.node_ids.iter().copied().zip(values).collect()
}

/// Principal eigenvector of the adjacency matrix by shifted power iteration
/// on `A + I`, starting from the uniform vector and normalised by the
/// Euclidean norm each round. Edge weights are ignored.
///
/// Fails with [`AnalysisError::ConvergenceFailure`] when the L1 change is
/// still above `n * tolerance` after `max_iterations` rounds.
pub fn eigenvector_centrality(
    graph: &CompressedGraph,
    limits: IterationLimits,
) -> Result<CentralityScores, AnalysisError> {
    let n = graph.node_count;
    if n == 0 {
        return Ok(CentralityScores::new());
    }

    let incoming = graph.transposed();
    let mut x = vec![1.0 / n as f64; n];

    for iteration in 1..=limits.max_iterations {
        let last = x;
        let mut next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|v| {
                last[v]
                    + incoming
                        .outgoing_edges(v)
                        .iter()
                        .map(|&u| last[u as usize])
                        .sum::<f64>()
            })
            .collect();

        let norm = next.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = if norm == 0.0 { 1.0 } else { norm };
        next.iter_mut().for_each(|v| *v /= norm);

        if l1_change(&next, &last) < n as f64 * limits.tolerance {
            log::debug!("Eigenvector centrality converged after {} iterations", iteration);
            return Ok(into_scores(graph, next));
        }
        x = next;
    }

    Err(AnalysisError::ConvergenceFailure {
        algorithm: "eigenvector centrality",
        iterations: limits.max_iterations,
    })
}

/// Stationary distribution of a random walk with damping `alpha`.
///
/// Undirected edges are walked both ways. Transition probabilities follow
/// edge weights when the graph carries them. Mass at dangling nodes is
/// spread uniformly.
pub fn pagerank(
    graph: &CompressedGraph,
    alpha: f64,
    limits: IterationLimits,
) -> Result<CentralityScores, AnalysisError> {
    let n = graph.node_count;
    if n == 0 {
        return Ok(CentralityScores::new());
    }

    let out_weight: Vec<f64> = (0..n).map(|u| graph.outgoing_weights(u).sum()).collect();
    let dangling: Vec<usize> = (0..n).filter(|&u| out_weight[u] == 0.0).collect();
    let incoming = graph.transposed();
    let uniform = 1.0 / n as f64;
    let mut x = vec![uniform; n];

    for iteration in 1..=limits.max_iterations {
        let last = x;
        let dangle_sum = alpha * dangling.iter().map(|&u| last[u]).sum::<f64>();
        let base = dangle_sum * uniform + (1.0 - alpha) * uniform;

        let next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|v| {
                let pulled: f64 = incoming
                    .outgoing_edges(v)
                    .iter()
                    .zip(incoming.outgoing_weights(v))
                    .map(|(&u, w)| {
                        let u = u as usize;
                        last[u] * w / out_weight[u]
                    })
                    .sum();
                alpha * pulled + base
            })
            .collect();

        if l1_change(&next, &last) < n as f64 * limits.tolerance {
            log::debug!("PageRank converged after {} iterations", iteration);
            return Ok(into_scores(graph, next));
        }
        x = next;
    }

    Err(AnalysisError::ConvergenceFailure {
        algorithm: "PageRank",
        iterations: limits.max_iterations,
    })
}
