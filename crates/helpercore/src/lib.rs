//! Core abstractions for the helper graph engine
//! 
//! This crate provides the value model, field schemas, the node trait and
//! the serialized record format that every other crate builds on. It knows
//! nothing about graph topology or evaluation order.

mod error;
pub mod events;
mod node;
mod record;
mod schema;
mod value;

pub use error::{GraphError, HelperError, NodeError};
pub use events::{EventBus, NodeReporter, NoteLevel, WalkEvent, WalkEventKind, WalkId};
pub use node::{Node, NodeContext, NodeOutput};
pub use record::{Dataset, FieldRef, HelperDefinition, NodeId, NodeRecord, Position};
pub use schema::{FieldType, InputField, NodeRole, NodeSchema, NodeStatus, OptionField, OutputField};
pub use value::{Element, Value};

/// Result type for helper operations
pub type Result<T> = std::result::Result<T, HelperError>;
