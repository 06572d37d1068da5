use crate::{FieldType, NodeId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    
    #[error("Node error: {0}")]
    Node(#[from] NodeError),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A helper with id '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid helper id '{0}'")]
    InvalidId(String),
}

/// Failures raised from inside a node's `process()`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),
    
    #[error("Invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },
    
    #[error("Configuration error: {0}")]
    Configuration(String),
    
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),
    
    #[error("Failed to construct node of type {node_type}: {source}")]
    Construction {
        node_type: String,
        #[source]
        source: NodeError,
    },
    
    #[error("Node with id {0} is already present in the graph")]
    DuplicateId(NodeId),
    
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),
    
    #[error("Node {node_id} has no {kind} field '{field}'")]
    UnknownField {
        node_id: NodeId,
        kind: &'static str,
        field: String,
    },
    
    #[error("Incompatible types from {supplier}:{output} ({output_type}) -> {consumer}:{input} ({input_type})")]
    IncompatibleTypes {
        supplier: NodeId,
        output: String,
        output_type: FieldType,
        consumer: NodeId,
        input: String,
        input_type: FieldType,
    },
    
    #[error("Connecting {supplier} -> {consumer} would create a cycle")]
    CyclicConnection { supplier: NodeId, consumer: NodeId },
    
    #[error("Inconsistent dataset: {0}")]
    InconsistentDataset(String),
    
    #[error("Node {node_id} ({node_type}) failed: {source}")]
    Processing {
        node_id: NodeId,
        node_type: String,
        #[source]
        source: NodeError,
    },
}
