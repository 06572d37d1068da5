//! Nodes marking where a helper graph is seeded and where it delivers.

use async_trait::async_trait;
use helpercore::{FieldType, Node, NodeContext, NodeError, NodeOutput, NodeRole, NodeSchema};

pub const REQUEST: &str = "request";
pub const MEDIA_URL: &str = "mediaUrl";
pub const MEDIA_TITLE: &str = "mediaTitle";
pub const PLAYER: &str = "player";
pub const PLAYER_RESULT: &str = "player.result";

/// Passes its seeded field through; an unseeded entry emits nothing
fn pass_seed(ctx: &NodeContext, field: &str) -> NodeOutput {
    NodeOutput::new().with_output(field, ctx.input(field).cloned())
}

/// Entry of a courier graph, seeded with the search query
#[derive(Default)]
pub struct RequestNode;

#[async_trait]
impl Node for RequestNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("query", FieldType::String)
            .with_role(NodeRole::Entry("query".to_string()))
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(pass_seed(&ctx, "query"))
    }
}

/// Entry of a player graph, seeded with the page URL
#[derive(Default)]
pub struct PlayerNode;

#[async_trait]
impl Node for PlayerNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_output("url", FieldType::String)
            .with_role(NodeRole::Entry("url".to_string()))
    }

    async fn process(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(pass_seed(&ctx, "url"))
    }
}

#[derive(Default)]
pub struct MediaUrlNode;

#[async_trait]
impl Node for MediaUrlNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("url", FieldType::String)
            .with_role(NodeRole::Result("url".to_string()))
    }

    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}

#[derive(Default)]
pub struct MediaTitleNode;

#[async_trait]
impl Node for MediaTitleNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_input("title", FieldType::String)
            .with_role(NodeRole::Result("title".to_string()))
    }

    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}

/// Result of a player graph: where the media and ads live on a page, and
/// which pages the player applies to
#[derive(Default)]
pub struct PlayerResultNode;

#[async_trait]
impl Node for PlayerResultNode {
    fn schema(&self) -> NodeSchema {
        NodeSchema::new()
            .with_optional_input("mediaSelectors", FieldType::String)
            .with_optional_input("adSelectors", FieldType::String)
            .with_option("urlPattern")
            .with_role(NodeRole::Result("player".to_string()))
    }

    async fn process(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new())
    }
}
