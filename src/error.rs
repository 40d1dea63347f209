//! Error taxonomy for graph loading and analysis

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the analysis core.
///
/// `InputNotFound`, `MalformedEdge` and `MissingColumn` are fatal and abort a
/// run before the graph is touched. `ConvergenceFailure` is scoped to one
/// (dataset, strategy) unit. `DegenerateGraph` is soft: the simulator maps it
/// to an efficiency of 0 and keeps going.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("malformed edge on line {line}: {reason}")]
    MalformedEdge { line: usize, reason: String },

    #[error("column '{0}' not found in centrality table")]
    MissingColumn(String),

    #[error("{algorithm} failed to converge within {iterations} iterations")]
    ConvergenceFailure {
        algorithm: &'static str,
        iterations: usize,
    },

    #[error("degenerate graph: {0}")]
    DegenerateGraph(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// True for errors that should only abandon the current strategy
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, AnalysisError::ConvergenceFailure { .. })
    }
}
