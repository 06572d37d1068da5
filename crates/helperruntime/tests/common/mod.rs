// Shared node types for runtime tests

#![allow(dead_code)]

use async_trait::async_trait;
use helpercore::{FieldType, Node, NodeContext, NodeError, NodeOutput, NodeRole, NodeSchema, Value};
use helperruntime::{DefaultFactory, Graph, NodeRegistry};
use std::sync::Arc;

/// Emits its `value` option as a number
#[derive(Default)]
pub struct ConstantNode;

#[async_trait]
impl Node for ConstantNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("value", FieldType::Number)
            .with_option_default("value", "5")
    }
    
    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value: f64 = ctx.option("value").parse()
            .map_err(|_| NodeError::Configuration(format!("not a number: {}", ctx.option("value"))))?;
        Ok(NodeOutput::new().with_output("value", value))
    }
}

/// Doubles its single input
#[derive(Default)]
pub struct DoubleNode;

#[async_trait]
impl Node for DoubleNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Number)
            .with_output("value", FieldType::Number)
    }
    
    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let value = ctx.require_input("value")?.to_number();
        Ok(NodeOutput::new().with_output("value", value * 2.0))
    }
}

/// Adds two numbers
#[derive(Default)]
pub struct SumNode;

#[async_trait]
impl Node for SumNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("left", FieldType::Number)
            .with_input("right", FieldType::Number)
            .with_optional_input("bonus", FieldType::Number)
            .with_output("value", FieldType::Number)
    }
    
    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let left = ctx.require_input("left")?.to_number();
        let right = ctx.require_input("right")?.to_number();
        let bonus = ctx.input("bonus").map(Value::to_number).unwrap_or(0.0);
        Ok(NodeOutput::new().with_output("value", left + right + bonus))
    }
}

/// Emits a fixed string
#[derive(Default)]
pub struct TextNode;

#[async_trait]
impl Node for TextNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("text", FieldType::String)
    }
    
    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("text", "hello"))
    }
}

/// Accepts anything and forwards it
#[derive(Default)]
pub struct PassNode;

#[async_trait]
impl Node for PassNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_output("value", FieldType::Any)
            .with_option("label")
    }
    
    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_output("value", ctx.require_input("value")?.clone()))
    }
}

/// Always fails
#[derive(Default)]
pub struct FailNode;

#[async_trait]
impl Node for FailNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_output("value", FieldType::Any)
    }
    
    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Err(NodeError::ExecutionFailed("boom".to_string()))
    }
}

/// Result sink read by callers
#[derive(Default)]
pub struct SinkNode;

#[async_trait]
impl Node for SinkNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("value", FieldType::Any)
            .with_role(NodeRole::Result("value".to_string()))
    }
    
    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}

pub fn test_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(DefaultFactory::<ConstantNode>::new("constant", "Number constant", "test")));
    registry.register(Arc::new(DefaultFactory::<DoubleNode>::new("double", "Doubles a number", "test")));
    registry.register(Arc::new(DefaultFactory::<SumNode>::new("sum", "Adds numbers", "test")));
    registry.register(Arc::new(DefaultFactory::<TextNode>::new("text", "String constant", "test")));
    registry.register(Arc::new(DefaultFactory::<PassNode>::new("pass", "Forwards a value", "test")));
    registry.register(Arc::new(DefaultFactory::<FailNode>::new("fail", "Always fails", "test")));
    registry.register(Arc::new(DefaultFactory::<SinkNode>::new("sink", "Result sink", "test")));
    registry
}

pub fn test_graph() -> Graph {
    Graph::new(Arc::new(test_registry()))
}
