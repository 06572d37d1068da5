//! Standard node library
//!
//! The vocabulary helper graphs are written in, plus the courier and player
//! front ends that drive them.

mod content;
pub mod document;
pub mod fetch;
pub mod helpers;
mod logic;
pub mod roles;
pub mod store;
mod string;
mod transform;

pub use content::{ContentNode, ContentNodeFactory, SelectorAllNode, SelectorNode};
pub use fetch::{FetchConfig, HttpFetcher, PageFetcher, RateLimiter};
pub use helpers::{load_definition, save_definition, Courier, MediaBinding, MediaResult, Player};
pub use store::HelperStore;
pub use logic::{
    parse_float, BooleanFalseNode, BooleanFromNode, BooleanTrueNode, BranchCoalesceNode, BranchNode,
    NumberDeclareNode, Operator,
};
pub use string::{
    simplify, MatchNode, StringCreateNode, StringFromNode, StringInsertNode, StringJoinNode,
    StringMatchesNode, StringSimplifyNode,
};
pub use transform::{convert, property, Action, ConvertNode, Format, PropertyNode};

use helperruntime::{DefaultFactory, NodeRegistry};
use std::sync::Arc;

/// Register the shared vocabulary; `content` nodes fetch through `fetcher`
pub fn register_all(registry: &mut NodeRegistry, fetcher: Arc<dyn PageFetcher>) {
    registry.register(Arc::new(DefaultFactory::<StringCreateNode>::new("string-create", "A constant string", "string")));
    registry.register(Arc::new(DefaultFactory::<StringFromNode>::new("string-from", "Textual form of any value", "string")));
    registry.register(Arc::new(DefaultFactory::<StringInsertNode>::new("string-insert", "Insert text into a string", "string")));
    registry.register(Arc::new(DefaultFactory::<StringJoinNode>::new("string-join", "Join two strings", "string")));
    registry.register(Arc::new(DefaultFactory::<StringSimplifyNode>::new("string-simplify", "Lower-case and strip diacritics", "string")));
    registry.register(Arc::new(DefaultFactory::<StringMatchesNode>::new("string-matches", "Test text against a pattern", "string")));
    registry.register(Arc::new(DefaultFactory::<MatchNode>::new("match", "First match of a pattern", "string")));

    registry.register(Arc::new(DefaultFactory::<BooleanTrueNode>::new("boolean-true", "Constant true", "logic")));
    registry.register(Arc::new(DefaultFactory::<BooleanFalseNode>::new("boolean-false", "Constant false", "logic")));
    registry.register(Arc::new(DefaultFactory::<BooleanFromNode>::new("boolean-from", "Truthiness of any value", "logic")));
    registry.register(Arc::new(DefaultFactory::<NumberDeclareNode>::new("number-declare", "A constant number", "logic")));
    registry.register(Arc::new(DefaultFactory::<BranchNode>::new("branch", "Route a value by comparison", "logic")));
    registry.register(Arc::new(DefaultFactory::<BranchCoalesceNode>::new("branch-coalesce", "First present value", "logic")));

    registry.register(Arc::new(DefaultFactory::<PropertyNode>::new("property", "Read a property", "transform")));
    registry.register(Arc::new(DefaultFactory::<ConvertNode>::new("convert", "Encode or decode text", "transform")));

    registry.register(Arc::new(ContentNodeFactory::new(fetcher)));
    registry.register(Arc::new(DefaultFactory::<SelectorNode>::new("selector", "First matching element", "content")));
    registry.register(Arc::new(DefaultFactory::<SelectorAllNode>::new("selector-all", "All matching elements", "content")));
}

/// Register the entry and result nodes of courier graphs
pub fn register_courier_nodes(registry: &mut NodeRegistry) {
    registry.register(Arc::new(DefaultFactory::<roles::RequestNode>::new(roles::REQUEST, "Search query entry", "courier")));
    registry.register(Arc::new(DefaultFactory::<roles::MediaUrlNode>::new(roles::MEDIA_URL, "Media URL result", "courier")));
    registry.register(Arc::new(DefaultFactory::<roles::MediaTitleNode>::new(roles::MEDIA_TITLE, "Media title result", "courier")));
}

/// Register the entry and result nodes of player graphs
pub fn register_player_nodes(registry: &mut NodeRegistry) {
    registry.register(Arc::new(DefaultFactory::<roles::PlayerNode>::new(roles::PLAYER, "Page URL entry", "player")));
    registry.register(Arc::new(DefaultFactory::<roles::PlayerResultNode>::new(roles::PLAYER_RESULT, "Media and ad selectors", "player")));
}

/// Registry holding everything a courier graph may use
pub fn courier_registry(fetcher: Arc<dyn PageFetcher>) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry, fetcher);
    register_courier_nodes(&mut registry);
    registry
}

/// Registry holding everything a player graph may use
pub fn player_registry(fetcher: Arc<dyn PageFetcher>) -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    register_all(&mut registry, fetcher);
    register_player_nodes(&mut registry);
    registry
}
