use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type NodeId = String;

/// The serialized id -> record form of a whole graph
pub type Dataset = BTreeMap<NodeId, NodeRecord>;

/// Complete helper definition as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperDefinition {
    pub name: String,
    pub nodes: Dataset,
}

impl HelperDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Dataset::new(),
        }
    }
}

/// Serialized state of one node: options and connection topology only.
/// Live input and output values are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub position: Position,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    /// Input field -> (supplier id, supplier output field)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub input: BTreeMap<String, (NodeId, String)>,

    /// Output field -> consumer id -> consumer input fields
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub output: BTreeMap<String, BTreeMap<NodeId, Vec<String>>>,
}

impl NodeRecord {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            position: Position::default(),
            node_type: node_type.into(),
            options: BTreeMap::new(),
            input: BTreeMap::new(),
            output: BTreeMap::new(),
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_input(
        mut self,
        field: impl Into<String>,
        supplier: impl Into<NodeId>,
        output: impl Into<String>,
    ) -> Self {
        self.input.insert(field.into(), (supplier.into(), output.into()));
        self
    }

    pub fn with_output(
        mut self,
        field: impl Into<String>,
        consumer: impl Into<NodeId>,
        input: impl Into<String>,
    ) -> Self {
        let fields = self
            .output
            .entry(field.into())
            .or_default()
            .entry(consumer.into())
            .or_default();
        fields.push(input.into());
        fields.sort();
        self
    }
}

/// Node position in the authoring surface; never affects evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.x, p.y]
    }
}

/// A specific field on a specific node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub node_id: NodeId,
    pub field: String,
}

impl FieldRef {
    pub fn new(node_id: impl Into<NodeId>, field: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            field: field.into(),
        }
    }
}
