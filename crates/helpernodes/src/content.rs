use crate::document;
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use helpercore::{Element, FieldType, Node, NodeContext, NodeError, NodeOutput, NodeSchema, Value};
use helperruntime::{NodeFactory, NodeMetadata};
use std::sync::Arc;

pub const CONTENT: &str = "content";

/// Fetches the page at `url` and emits its root element
pub struct ContentNode {
    fetcher: Arc<dyn PageFetcher>,
}

impl ContentNode {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Node for ContentNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("url", FieldType::String)
            .with_output("root", FieldType::Element)
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let url = ctx.require_str("url")?;

        ctx.events.info(format!("Fetching {}", url));
        let markup = self.fetcher.fetch(url).await?;
        ctx.events.info(format!("Fetched {} bytes", markup.len()));

        Ok(NodeOutput::new().with_output("root", document::page_element(&markup, url)))
    }
}

/// Builds content nodes sharing one fetcher
pub struct ContentNodeFactory {
    fetcher: Arc<dyn PageFetcher>,
}

impl ContentNodeFactory {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

impl NodeFactory for ContentNodeFactory {
    fn create(&self) -> Result<Arc<dyn Node>, NodeError> {
        Ok(Arc::new(ContentNode::new(Arc::clone(&self.fetcher))))
    }

    fn node_type(&self) -> &str {
        CONTENT
    }

    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::new("Fetch a page and emit its root element", "content")
    }
}

fn require_element<'a>(ctx: &'a NodeContext, field: &str) -> Result<&'a Element, NodeError> {
    let value = ctx.require_input(field)?;
    value.as_element().ok_or_else(|| NodeError::InvalidInputType {
        field: field.to_string(),
        expected: "element".to_string(),
        actual: value.kind().to_string(),
    })
}

/// First element under `root` matching the `selectors` option
#[derive(Default)]
pub struct SelectorNode;

#[async_trait]
impl Node for SelectorNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("root", FieldType::Element)
            .with_output("found", FieldType::Element)
            .with_option("selectors")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let root = require_element(&ctx, "root")?;
        let found = document::select_first(root, ctx.option("selectors"))?;
        Ok(NodeOutput::new().with_output("found", found))
    }
}

/// Every element under `root` matching the `selectors` option
#[derive(Default)]
pub struct SelectorAllNode;

#[async_trait]
impl Node for SelectorAllNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("root", FieldType::Element)
            .with_output("found", FieldType::Any)
            .with_option("selectors")
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let root = require_element(&ctx, "root")?;
        let found = document::select_all(root, ctx.option("selectors"))?;
        Ok(NodeOutput::new().with_output("found", Value::Array(found.into_iter().map(Value::from).collect())))
    }
}
