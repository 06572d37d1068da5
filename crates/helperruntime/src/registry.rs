use helpercore::{GraphError, Node, NodeError};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Factory trait for creating node instances
pub trait NodeFactory: Send + Sync {
    /// Create a fresh instance of the node
    fn create(&self) -> Result<Arc<dyn Node>, NodeError>;
    
    /// Type name the factory registers under by default
    fn node_type(&self) -> &str;
    
    /// Optional: description and category shown to authors
    fn metadata(&self) -> NodeMetadata {
        NodeMetadata::default()
    }
}

/// Metadata about a node type
#[derive(Debug, Clone)]
pub struct NodeMetadata {
    pub description: String,
    pub category: String,
}

impl NodeMetadata {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self {
            description: String::new(),
            category: "general".to_string(),
        }
    }
}

/// Factory for stateless nodes that are built with `Default`
pub struct DefaultFactory<N> {
    node_type: &'static str,
    metadata: NodeMetadata,
    _node: PhantomData<fn() -> N>,
}

impl<N> DefaultFactory<N>
where
    N: Node + Default + 'static,
{
    pub fn new(node_type: &'static str, description: &str, category: &str) -> Self {
        Self {
            node_type,
            metadata: NodeMetadata::new(description, category),
            _node: PhantomData,
        }
    }
}

impl<N> NodeFactory for DefaultFactory<N>
where
    N: Node + Default + 'static,
{
    fn create(&self) -> Result<Arc<dyn Node>, NodeError> {
        Ok(Arc::new(N::default()))
    }
    
    fn node_type(&self) -> &str {
        self.node_type
    }
    
    fn metadata(&self) -> NodeMetadata {
        self.metadata.clone()
    }
}

/// Bidirectional table of node type names and their factories
pub struct NodeRegistry {
    factories: HashMap<String, Arc<dyn NodeFactory>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
    
    /// Register a factory under its own type name
    pub fn register(&mut self, factory: Arc<dyn NodeFactory>) {
        let node_type = factory.node_type().to_string();
        self.register_as(node_type, factory);
    }
    
    /// Bind a name to a factory, replacing any previous binding of that name
    pub fn register_as(&mut self, node_type: impl Into<String>, factory: Arc<dyn NodeFactory>) {
        let node_type = node_type.into();
        tracing::info!("Registering node type: {}", node_type);
        if self.factories.insert(node_type.clone(), factory).is_some() {
            tracing::debug!("Node type {} was already registered, replaced", node_type);
        }
    }
    
    pub fn factory(&self, node_type: &str) -> Result<&Arc<dyn NodeFactory>, GraphError> {
        self.factories.get(node_type)
            .ok_or_else(|| GraphError::UnknownNodeType(node_type.to_string()))
    }
    
    /// Create a node instance from a type name
    pub fn create_node(&self, node_type: &str) -> Result<Arc<dyn Node>, GraphError> {
        self.factory(node_type)?
            .create()
            .map_err(|e| GraphError::Construction {
                node_type: node_type.to_string(),
                source: e,
            })
    }
    
    /// Recover the name a factory is registered under
    pub fn type_name_of(&self, factory: &Arc<dyn NodeFactory>) -> Option<&str> {
        let mut names: Vec<&str> = self.factories
            .iter()
            .filter(|(_, f)| Arc::ptr_eq(f, factory))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names.first().copied()
    }
    
    pub fn contains(&self, node_type: &str) -> bool {
        self.factories.contains_key(node_type)
    }
    
    /// Get all registered node types, sorted
    pub fn list_node_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.factories.keys().cloned().collect();
        types.sort();
        types
    }
    
    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<NodeMetadata> {
        self.factories.get(node_type).map(|f| f.metadata())
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
