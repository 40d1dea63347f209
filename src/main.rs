use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use graph_robustness_analyzer::centrality::{build_strategies, StrategyKind};
use graph_robustness_analyzer::community::GirvanNewman;
use graph_robustness_analyzer::config::{
    Config, GraphMode, IterationLimits, OutputFormat, Preprocessing, SamplingMode,
};
use graph_robustness_analyzer::data::{edgelist, preprocessing};
use graph_robustness_analyzer::graph::Graph;
use graph_robustness_analyzer::progress::LogProgress;
use graph_robustness_analyzer::robustness;
use graph_robustness_analyzer::storage::FileRecorder;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "graph-robustness-analyzer",
    about = "Community structure and attack robustness of large networks"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0", global = true)]
    threads: usize,

    /// Verbose logging
    #[clap(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Girvan-Newman community detection with best-partition tracking
    Communities {
        #[clap(flatten)]
        graph: GraphArgs,

        /// Modularity resolution
        #[clap(long, default_value = "1.0")]
        resolution: f64,
    },

    /// Sequential node-removal simulation for one or more strategies
    Robustness {
        #[clap(flatten)]
        graph: GraphArgs,

        /// Ranking strategies to simulate, each on its own graph copy
        #[clap(long, value_enum, num_args = 1.., required = true)]
        strategy: Vec<StrategyKind>,

        /// Precomputed centrality table (CSV, node id in the first column)
        #[clap(long)]
        table: Option<PathBuf>,

        /// Score column of the centrality table
        #[clap(long)]
        column: Option<String>,

        /// Seed for the random strategies
        #[clap(long)]
        seed: Option<u64>,

        /// PageRank damping factor
        #[clap(long, default_value = "0.85")]
        damping: f64,

        /// Iteration cap for eigenvector centrality and PageRank
        #[clap(long, default_value = "1000")]
        max_iter: usize,

        /// Per-node convergence tolerance
        #[clap(long, default_value = "1e-6")]
        tolerance: f64,

        /// Draw the curious order without replacement
        #[clap(long)]
        without_replacement: bool,

        /// Log every N removal steps
        #[clap(long, default_value = "100")]
        progress_interval: usize,
    },
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Path to the edge-list file
    #[clap(long)]
    input: PathBuf,

    /// Read edges as ordered pairs
    #[clap(long)]
    directed: bool,

    /// Read a third column as edge weight
    #[clap(long)]
    weighted: bool,

    /// Keep only the largest (strongly) connected component
    #[clap(long)]
    largest_component: bool,

    /// Convert to an undirected graph after loading
    #[clap(long)]
    undirected: bool,

    /// Discard edge weights after loading
    #[clap(long)]
    drop_weights: bool,

    /// Dataset label used in output file names
    #[clap(long, default_value = "graph")]
    dataset: String,

    /// Output directory for results
    #[clap(long, default_value = "results")]
    output_dir: PathBuf,

    /// Serialization of snapshot and trace records
    #[clap(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

impl GraphArgs {
    fn config(&self) -> Config {
        Config {
            dataset: self.dataset.clone(),
            mode: GraphMode::new(self.directed, self.weighted),
            preprocessing: Preprocessing {
                largest_component: self.largest_component,
                to_undirected: self.undirected,
                drop_weights: self.drop_weights,
            },
            output_dir: self.output_dir.clone(),
            output_format: self.format,
            ..Config::default()
        }
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    match args.command {
        Command::Communities { graph, resolution } => {
            let config = Config {
                resolution,
                ..graph.config()
            };
            run_communities(&graph.input, &config)
        }
        Command::Robustness {
            graph,
            strategy,
            table,
            column,
            seed,
            damping,
            max_iter,
            tolerance,
            without_replacement,
            progress_interval,
        } => {
            let config = Config {
                seed,
                damping,
                limits: IterationLimits {
                    max_iterations: max_iter,
                    tolerance,
                },
                sampling: if without_replacement {
                    SamplingMode::WithoutReplacement
                } else {
                    SamplingMode::WithReplacement
                },
                progress_interval,
                ..graph.config()
            };
            let table = match (table, column) {
                (Some(path), Some(column)) => Some((path, column)),
                (None, None) => None,
                _ => return Err(anyhow!("--table and --column must be given together")),
            };
            run_robustness(&graph.input, &config, &strategy, table)
        }
    }
}

fn load(input: &Path, config: &Config) -> Result<Graph> {
    let graph = edgelist::load_edge_list(input, config.mode)?;
    Ok(preprocessing::prepare(graph, config.preprocessing))
}

fn run_communities(input: &Path, config: &Config) -> Result<()> {
    log::info!("Starting community detection on {}", input.display());
    let graph = load(input, config)?;

    let mut recorder = FileRecorder::new(&config.output_dir, &config.dataset, config.output_format)?;
    let progress = LogProgress {
        interval: config.progress_interval,
    };
    let run = GirvanNewman::new(&graph, config.resolution).run(&mut recorder, &progress)?;

    if let Some(best) = run.best {
        log::info!(
            "Best partition: iteration {} with modularity {:.4}, {} communities",
            best.iteration,
            best.modularity,
            best.communities.len()
        );
    }
    log::info!(
        "History saved to {}",
        recorder.modularity_log_path().display()
    );
    Ok(())
}

fn run_robustness(
    input: &Path,
    config: &Config,
    kinds: &[StrategyKind],
    table: Option<(PathBuf, String)>,
) -> Result<()> {
    log::info!("Starting robustness simulation on {}", input.display());

    // Table and strategy errors are fatal before the graph is touched
    let table = table.as_ref().map(|(path, column)| (path.as_path(), column.as_str()));
    let mut strategies = build_strategies(kinds, config, table)?;

    let graph = load(input, config)?;
    let mut recorder = FileRecorder::new(&config.output_dir, &config.dataset, config.output_format)?;
    let progress = LogProgress {
        interval: config.progress_interval,
    };

    let abandoned = robustness::run_strategies(&graph, &mut strategies, &mut recorder, &progress)?;
    if !abandoned.is_empty() {
        log::warn!(
            "{} of {} strategies did not converge: {}",
            abandoned.len(),
            strategies.len(),
            abandoned.join(", ")
        );
    }
    log::info!("Simulation complete. Results saved to {}", config.output_dir.display());
    Ok(())
}
