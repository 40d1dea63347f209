//! Structural robustness and community analysis for large networks

pub mod centrality;
pub mod community;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod progress;
pub mod robustness;
pub mod storage;

pub use anyhow::{anyhow, Result};
pub use error::AnalysisError;
