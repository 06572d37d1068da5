//! Front ends that drive helper graphs.
//!
//! A courier turns a search query into a media URL and title; a player
//! turns a page URL into the selectors locating media and ads on it.

use crate::roles;
use crate::string::compile;
use helpercore::{GraphError, HelperDefinition, HelperError, NodeError, NodeRole, Value};
use helperruntime::{Graph, GraphNode, NodeRegistry, WalkSummary};
use std::path::Path;
use std::sync::Arc;

/// Read a stored helper definition
pub async fn load_definition(path: impl AsRef<Path>) -> Result<HelperDefinition, HelperError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Store a helper definition as pretty-printed JSON
pub async fn save_definition(path: impl AsRef<Path>, definition: &HelperDefinition) -> Result<(), HelperError> {
    let content = serde_json::to_string_pretty(definition)?;
    tokio::fs::write(path.as_ref(), content).await?;
    Ok(())
}

/// Build a graph from a stored definition
fn graph_from(definition: &HelperDefinition, registry: Arc<NodeRegistry>) -> Result<Graph, GraphError> {
    let mut graph = Graph::new(registry);
    graph.set_dataset(&definition.nodes)?;
    Ok(graph)
}

/// Clear every live value, seed every entry node with `value`, then walk
async fn seed_and_walk(graph: &mut Graph, value: &str) -> Result<WalkSummary, GraphError> {
    graph.reset_values();

    let entries: Vec<(String, String)> = graph.nodes()
        .filter_map(|node| match node.role() {
            NodeRole::Entry(field) => Some((node.id().to_string(), field.clone())),
            _ => None,
        })
        .collect();

    for (id, field) in entries {
        graph.set_input(&id, &field, value)?;
    }

    graph.walk().await
}

/// Live value of `field` on the first result node for `slot` that holds one
fn result_value(graph: &Graph, slot: &str, field: &str) -> Option<String> {
    let role = NodeRole::Result(slot.to_string());
    let mut nodes: Vec<&GraphNode> = graph.nodes_with_role(&role).collect();
    nodes.sort_by(|a, b| a.id().cmp(b.id()));
    nodes.into_iter()
        .find_map(|node| node.input(field))
        .map(Value::to_text)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaResult {
    pub url: String,
    pub title: Option<String>,
}

/// Finds media for a search query
pub struct Courier {
    name: String,
    graph: Graph,
}

impl Courier {
    pub fn new(name: impl Into<String>, registry: Arc<NodeRegistry>) -> Self {
        Self {
            name: name.into(),
            graph: Graph::new(registry),
        }
    }

    pub fn from_definition(definition: &HelperDefinition, registry: Arc<NodeRegistry>) -> Result<Self, GraphError> {
        Ok(Self {
            name: definition.name.clone(),
            graph: graph_from(definition, registry)?,
        })
    }

    pub fn definition(&self) -> HelperDefinition {
        HelperDefinition {
            name: self.name.clone(),
            nodes: self.graph.dataset(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Run the graph for `query`; `None` when no media URL came out
    pub async fn find(&mut self, query: &str) -> Result<Option<MediaResult>, GraphError> {
        tracing::info!("Courier {} searching for '{}'", self.name, query);
        seed_and_walk(&mut self.graph, query).await?;

        let Some(url) = result_value(&self.graph, "url", "url") else {
            tracing::debug!("Courier {} found nothing for '{}'", self.name, query);
            return Ok(None);
        };

        Ok(Some(MediaResult {
            url,
            title: result_value(&self.graph, "title", "title"),
        }))
    }
}

/// Where media and ads live on a page a player applies to
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBinding {
    pub media_selectors: String,
    pub ad_selectors: Option<String>,
}

/// Locates media on pages whose URL matches its pattern
pub struct Player {
    name: String,
    graph: Graph,
}

impl Player {
    pub fn new(name: impl Into<String>, registry: Arc<NodeRegistry>) -> Self {
        Self {
            name: name.into(),
            graph: Graph::new(registry),
        }
    }

    pub fn from_definition(definition: &HelperDefinition, registry: Arc<NodeRegistry>) -> Result<Self, GraphError> {
        Ok(Self {
            name: definition.name.clone(),
            graph: graph_from(definition, registry)?,
        })
    }

    pub fn definition(&self) -> HelperDefinition {
        HelperDefinition {
            name: self.name.clone(),
            nodes: self.graph.dataset(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    fn result_node(&self) -> Option<&GraphNode> {
        self.graph.nodes_of_type(roles::PLAYER_RESULT).min_by(|a, b| a.id().cmp(b.id()))
    }

    /// Pattern of page URLs this player applies to
    pub fn url_pattern(&self) -> Option<String> {
        self.result_node()
            .map(|node| node.option("urlPattern"))
            .filter(|pattern| !pattern.is_empty())
    }

    pub fn matches(&self, url: &str) -> Result<bool, NodeError> {
        match self.url_pattern() {
            Some(pattern) => compile(&pattern)?
                .is_match(url)
                .map_err(|e| NodeError::ExecutionFailed(e.to_string())),
            None => Ok(false),
        }
    }

    /// First player applying to `url`; players with a malformed pattern are
    /// skipped
    pub fn select<'a>(players: &'a [Player], url: &str) -> Option<&'a Player> {
        players.iter().find(|player| match player.matches(url) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!("Skipping player {}: {}", player.name, e);
                false
            }
        })
    }

    /// Run the graph for the page at `url`
    pub async fn binding(&mut self, url: &str) -> Result<Option<MediaBinding>, GraphError> {
        tracing::info!("Player {} binding {}", self.name, url);
        seed_and_walk(&mut self.graph, url).await?;

        let Some(node) = self.result_node() else {
            tracing::warn!("Player {} has no result node", self.name);
            return Ok(None);
        };

        let Some(media_selectors) = node.input("mediaSelectors").map(Value::to_text) else {
            return Ok(None);
        };

        Ok(Some(MediaBinding {
            media_selectors,
            ad_selectors: node.input("adSelectors").map(Value::to_text),
        }))
    }
}
