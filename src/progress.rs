//! Progress observers for the long-running removal loops

/// Hooks invoked at well-defined points of a run. All methods default to
/// no-ops so implementors only override what they care about.
pub trait Progress: Sync {
    /// A Girvan-Newman iteration is about to remove edges
    fn iteration_started(&self, _iteration: usize) {}

    /// A Girvan-Newman iteration produced a partition
    fn partition_found(&self, _iteration: usize, _communities: usize, _modularity: f64) {}

    /// A partition beat the best modularity seen so far
    fn new_best(&self, _iteration: usize, _modularity: f64) {}

    /// The robustness simulator consumed entry `step` of `total`
    fn step(&self, _step: usize, _total: usize) {}
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {}

/// Forwards events to the `log` facade
#[derive(Debug, Clone, Copy)]
pub struct LogProgress {
    /// Report every `interval`-th simulation step
    pub interval: usize,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self { interval: 100 }
    }
}

impl Progress for LogProgress {
    fn iteration_started(&self, iteration: usize) {
        log::debug!("Iteration {}: computing edge betweenness", iteration);
    }

    fn partition_found(&self, iteration: usize, communities: usize, modularity: f64) {
        log::info!(
            "Iteration {}: modularity = {:.4} | communities: {}",
            iteration,
            modularity,
            communities
        );
    }

    fn new_best(&self, iteration: usize, modularity: f64) {
        log::info!(
            "New best partition at iteration {} with modularity {:.4}",
            iteration,
            modularity
        );
    }

    fn step(&self, step: usize, total: usize) {
        if self.interval > 0 && step % self.interval == 0 {
            log::info!("Step {}/{}", step, total);
        }
    }
}
