use crate::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Declared type of a connection field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Wildcard, connects to anything
    Any,
    String,
    Number,
    Boolean,
    Element,
}

impl FieldType {
    /// Two fields may be connected when their types match or either is a wildcard
    pub fn is_compatible(self, other: FieldType) -> bool {
        self == FieldType::Any || other == FieldType::Any || self == other
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Any => "Any",
            FieldType::String => "String",
            FieldType::Number => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Element => "Element",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputField {
    pub name: String,
    pub field_type: FieldType,
    /// Optional inputs never hold back a node's status
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputField {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionField {
    pub name: String,
    pub default: Option<String>,
}

/// Part a node plays for the application driving the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Standard,
    /// Seeded by the caller through the named input before a walk
    Entry(String),
    /// Read by the caller after a walk; the string names the result slot
    Result(String),
}

/// Input satisfaction state, derived from live inputs on every query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// No required input has a value
    Latent,
    /// Some required inputs have values
    Partial,
    /// Every required input has a value
    Complete,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Latent => "latent",
            NodeStatus::Partial => "partial",
            NodeStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Fields a node type declares
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSchema {
    pub inputs: Vec<InputField>,
    pub outputs: Vec<OutputField>,
    pub options: Vec<OptionField>,
    pub role: NodeRole,
}

impl Default for NodeSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeSchema {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: Vec::new(),
            role: NodeRole::Standard,
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.inputs.push(InputField {
            name: name.into(),
            field_type,
            optional: false,
        });
        self
    }

    pub fn with_optional_input(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.inputs.push(InputField {
            name: name.into(),
            field_type,
            optional: true,
        });
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.outputs.push(OutputField {
            name: name.into(),
            field_type,
        });
        self
    }

    pub fn with_option(mut self, name: impl Into<String>) -> Self {
        self.options.push(OptionField {
            name: name.into(),
            default: None,
        });
        self
    }

    pub fn with_option_default(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.options.push(OptionField {
            name: name.into(),
            default: Some(default.into()),
        });
        self
    }

    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputField> {
        self.inputs.iter().find(|f| f.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&OutputField> {
        self.outputs.iter().find(|f| f.name == name)
    }

    pub fn option(&self, name: &str) -> Option<&OptionField> {
        self.options.iter().find(|f| f.name == name)
    }

    /// Nodes without declared inputs seed propagation
    pub fn is_bootstrapper(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn status(&self, values: &HashMap<String, Value>) -> NodeStatus {
        let mut required = self.inputs.iter().filter(|f| !f.optional).peekable();

        if required.peek().is_none() {
            return NodeStatus::Complete;
        }

        let (present, missing) = required.fold((0usize, 0usize), |(present, missing), field| {
            if values.contains_key(&field.name) {
                (present + 1, missing)
            } else {
                (present, missing + 1)
            }
        });

        match (present, missing) {
            (_, 0) => NodeStatus::Complete,
            (0, _) => NodeStatus::Latent,
            _ => NodeStatus::Partial,
        }
    }
}
