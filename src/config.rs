//! Configuration management for the robustness analyzer

use std::path::PathBuf;

/// How edges are interpreted when a graph is loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphMode {
    /// Edges are ordered pairs
    pub directed: bool,

    /// A third column carries an edge weight
    pub weighted: bool,
}

impl GraphMode {
    pub fn new(directed: bool, weighted: bool) -> Self {
        Self { directed, weighted }
    }
}

/// Sampling used by the rank-weighted ("curious") strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplingMode {
    /// Draw `n` nodes with replacement; duplicates become no-op removals
    #[default]
    WithReplacement,

    /// Draw a full weighted permutation
    WithoutReplacement,
}

/// Serialized form of snapshot and trace records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Bincode,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Bincode => "bin",
        }
    }
}

/// Optional stages applied to a freshly loaded graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preprocessing {
    /// Keep only the largest (strongly) connected component
    pub largest_component: bool,

    /// Union reciprocal edges into an undirected graph
    pub to_undirected: bool,

    /// Discard edge weights
    pub drop_weights: bool,
}

/// Power-iteration limits shared by eigenvector centrality and PageRank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationLimits {
    /// Hard cap on iterations before reporting a convergence failure
    pub max_iterations: usize,

    /// Per-node tolerance; convergence when the L1 change < n * tolerance
    pub tolerance: f64,
}

impl Default for IterationLimits {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Default configuration for the robustness analyzer
#[derive(Debug, Clone)]
pub struct Config {
    /// Label used in output file names
    pub dataset: String,

    /// Edge-list interpretation
    pub mode: GraphMode,

    /// Dataset preparation stages
    pub preprocessing: Preprocessing,

    /// Seed for the random strategies; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// PageRank damping factor
    pub damping: f64,

    /// Modularity resolution
    pub resolution: f64,

    /// Eigenvector/PageRank iteration limits
    pub limits: IterationLimits,

    /// Sampling mode of the curious strategy
    pub sampling: SamplingMode,

    /// Emit a progress line every this many removal steps
    pub progress_interval: usize,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// Record serialization format
    pub output_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: "graph".to_string(),
            mode: GraphMode::default(),
            preprocessing: Preprocessing::default(),
            seed: None,
            damping: 0.85,
            resolution: 1.0,
            limits: IterationLimits::default(),
            sampling: SamplingMode::default(),
            progress_interval: 100,
            output_dir: PathBuf::from("results"),
            output_format: OutputFormat::default(),
        }
    }
}
