//! Input loading and dataset preparation

pub mod centrality_table;
pub mod edgelist;
pub mod preprocessing;
