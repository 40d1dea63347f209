//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod compressed;
pub mod store;

pub use compressed::CompressedGraph;
pub use store::{Graph, NodeId};
