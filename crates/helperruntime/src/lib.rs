//! Graph runtime for helper definitions
//! 
//! This crate owns the node type registry, the graph topology, push-based
//! propagation and the reversible edit history used by authoring tools.

mod actions;
mod graph;
mod history;
mod propagation;
mod registry;

pub use actions::{Action, Connect, Create, Delete, Move, SetOption};
pub use graph::{Graph, GraphConfig, GraphNode};
pub use history::History;
pub use propagation::WalkSummary;
pub use registry::{DefaultFactory, NodeFactory, NodeMetadata, NodeRegistry};
