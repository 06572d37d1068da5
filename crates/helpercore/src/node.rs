use crate::{events::NodeReporter, NodeError, NodeId, NodeSchema, Value};
use async_trait::async_trait;
use std::collections::HashMap;

/// Core trait that every node type implements
#[async_trait]
pub trait Node: Send + Sync {
    /// Declared input, output and option fields. Read once when a node of
    /// this type joins a graph.
    fn schema(&self) -> NodeSchema;
    
    /// Compute outputs from the current inputs and options.
    ///
    /// Only nodes fronting an external collaborator should do I/O here; the
    /// rest must be a pure function of their declared fields.
    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError>;
}

/// Everything a node sees while processing
#[derive(Clone)]
pub struct NodeContext {
    pub node_id: NodeId,
    
    /// Live input values delivered by suppliers (or seeded by the caller)
    pub inputs: HashMap<String, Value>,
    
    /// Option values with declared defaults already applied
    pub options: HashMap<String, String>,
    
    /// Notes sent here show up among the walk's events
    pub events: NodeReporter,
}

impl NodeContext {
    pub fn new(node_id: impl Into<NodeId>, events: NodeReporter) -> Self {
        Self {
            node_id: node_id.into(),
            inputs: HashMap::new(),
            options: HashMap::new(),
            events,
        }
    }
    
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }
    
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
    
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }
    
    /// Get required input or return error
    pub fn require_input(&self, name: &str) -> Result<&Value, NodeError> {
        self.inputs.get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }
    
    /// Get a required string input
    pub fn require_str(&self, name: &str) -> Result<&str, NodeError> {
        let value = self.require_input(name)?;
        value.as_str().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "string".to_string(),
            actual: value.kind().to_string(),
        })
    }
    
    /// Option value; options are never missing, absent ones read as empty
    pub fn option(&self, name: &str) -> &str {
        self.options.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Output from node processing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeOutput {
    /// Output field values; a null value means the field receives nothing
    pub outputs: HashMap<String, Value>,
}

impl NodeOutput {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn with_output(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(field.into(), value.into());
        self
    }
    
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.outputs.get(field).filter(|v| !v.is_null())
    }
}
