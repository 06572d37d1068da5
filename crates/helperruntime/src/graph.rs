use crate::registry::NodeRegistry;
use helpercore::{
    Dataset, EventBus, FieldRef, GraphError, Node, NodeId, NodeRecord, NodeRole,
    NodeSchema, NodeStatus, Position, Value, WalkEvent,
};
use petgraph::algo::{has_path_connecting, is_cyclic_directed};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Configuration for a graph
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub event_buffer_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 256,
        }
    }
}

/// Edge weight: which supplier output feeds which consumer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) output: String,
    pub(crate) input: String,
}

/// A live node inside a graph
#[derive(Clone)]
pub struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) node_type: String,
    pub(crate) position: Position,
    pub(crate) options: BTreeMap<String, String>,
    pub(crate) schema: Arc<NodeSchema>,
    pub(crate) behavior: Arc<dyn Node>,
    pub(crate) inputs: HashMap<String, Value>,
    pub(crate) outputs: HashMap<String, Value>,
}

impl GraphNode {
    fn new(id: NodeId, node_type: String, behavior: Arc<dyn Node>) -> Self {
        let schema = Arc::new(behavior.schema());
        Self {
            id,
            node_type,
            position: Position::default(),
            options: BTreeMap::new(),
            schema,
            behavior,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    pub fn role(&self) -> &NodeRole {
        &self.schema.role
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn is_bootstrapper(&self) -> bool {
        self.schema.is_bootstrapper()
    }

    pub fn status(&self) -> NodeStatus {
        self.schema.status(&self.inputs)
    }

    pub fn input(&self, field: &str) -> Option<&Value> {
        self.inputs.get(field)
    }

    pub fn output(&self, field: &str) -> Option<&Value> {
        self.outputs.get(field)
    }

    pub fn outputs(&self) -> &HashMap<String, Value> {
        &self.outputs
    }

    /// Store a live input value. A null value clears the field instead.
    ///
    /// Any field name is accepted so that entry nodes can be seeded through
    /// fields they do not declare.
    pub fn set_input(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        match value.into() {
            Value::Null => {
                self.inputs.remove(&field);
            }
            value => {
                self.inputs.insert(field, value);
            }
        }
    }

    /// Explicitly set option value, else the declared default, else empty
    pub fn option(&self, field: &str) -> String {
        self.options
            .get(field)
            .cloned()
            .or_else(|| self.schema.option(field).and_then(|o| o.default.clone()))
            .unwrap_or_default()
    }

    /// Option value as stored in the record, without defaults
    pub fn explicit_option(&self, field: &str) -> Option<&str> {
        self.options.get(field).map(String::as_str)
    }

    pub fn set_option(&mut self, field: &str, value: impl Into<String>) -> Result<(), GraphError> {
        if self.schema.option(field).is_none() {
            return Err(self.unknown_field("option", field));
        }
        self.options.insert(field.to_string(), value.into());
        Ok(())
    }

    pub fn clear_option(&mut self, field: &str) {
        self.options.remove(field);
    }

    /// Drop every live input and output value
    pub fn reset(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
    }

    pub(crate) fn resolved_options(&self) -> HashMap<String, String> {
        let mut options: HashMap<String, String> = self.schema.options
            .iter()
            .map(|o| (o.name.clone(), self.option(&o.name)))
            .collect();
        for (key, value) in &self.options {
            options.entry(key.clone()).or_insert_with(|| value.clone());
        }
        options
    }

    fn unknown_field(&self, kind: &'static str, field: &str) -> GraphError {
        GraphError::UnknownField {
            node_id: self.id.clone(),
            kind,
            field: field.to_string(),
        }
    }
}

impl fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphNode")
            .field("id", &self.id)
            .field("node_type", &self.node_type)
            .field("position", &self.position)
            .field("options", &self.options)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// Owning collection of connected nodes.
///
/// Topology lives in a single arena of nodes and links, so the supplier and
/// consumer views of a connection can never disagree. Serialized records are
/// derived from it on export.
#[derive(Clone)]
pub struct Graph {
    registry: Arc<NodeRegistry>,
    pub(crate) topology: StableDiGraph<GraphNode, Link>,
    indices: HashMap<NodeId, NodeIndex>,
    pub(crate) events: Arc<EventBus>,
}

impl Graph {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self::with_config(registry, GraphConfig::default())
    }

    pub fn with_config(registry: Arc<NodeRegistry>, config: GraphConfig) -> Self {
        Self::with_event_bus(registry, Arc::new(EventBus::new(config.event_buffer_size)))
    }

    pub fn with_event_bus(registry: Arc<NodeRegistry>, events: Arc<EventBus>) -> Self {
        Self {
            registry,
            topology: StableDiGraph::new(),
            indices: HashMap::new(),
            events,
        }
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Subscribe to walk events
    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<WalkEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.indices.contains_key(id)
    }

    /// Build a detached node of a registered type. Fresh nodes start with
    /// their declared option defaults written into the record.
    pub fn construct(&self, node_type: &str, id: impl Into<NodeId>) -> Result<GraphNode, GraphError> {
        let behavior = self.registry.create_node(node_type)?;
        let mut node = GraphNode::new(id.into(), node_type.to_string(), behavior);
        let defaults: Vec<(String, String)> = node.schema.options
            .iter()
            .filter_map(|o| o.default.as_ref().filter(|d| !d.is_empty()).map(|d| (o.name.clone(), d.clone())))
            .collect();
        node.options.extend(defaults);
        Ok(node)
    }

    /// Build a detached node from a stored record; connections are not restored
    pub fn construct_from_record(&self, id: impl Into<NodeId>, record: &NodeRecord) -> Result<GraphNode, GraphError> {
        let behavior = self.registry.create_node(&record.node_type)?;
        let mut node = GraphNode::new(id.into(), record.node_type.clone(), behavior);
        node.position = record.position;
        node.options = record.options.clone();
        Ok(node)
    }

    /// Create a node of a registered type under a generated id
    pub fn create_node(&mut self, node_type: &str) -> Result<NodeId, GraphError> {
        self.create_node_with_id(node_type, Uuid::new_v4().to_string())
    }

    pub fn create_node_with_id(&mut self, node_type: &str, id: impl Into<NodeId>) -> Result<NodeId, GraphError> {
        let node = self.construct(node_type, id)?;
        let id = node.id.clone();
        self.add_node(node)?;
        Ok(id)
    }

    /// Insert an already constructed node
    pub fn add_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.indices.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }

        tracing::debug!("Adding node {} ({})", node.id, node.node_type);
        let id = node.id.clone();
        let index = self.topology.add_node(node);
        self.indices.insert(id, index);
        Ok(())
    }

    /// Remove a node after severing every connection touching it.
    /// Consumers lose the value they were receiving from it.
    pub fn remove_node(&mut self, id: &str) -> Option<GraphNode> {
        let index = self.indices.remove(id)?;

        let deliveries: Vec<(NodeIndex, String)> = self.topology
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.target(), e.weight().input.clone()))
            .collect();
        for (consumer, input) in deliveries {
            self.topology[consumer].inputs.remove(&input);
        }

        tracing::debug!("Removing node {}", id);
        self.topology.remove_node(index)
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.topology.clear();
        self.indices.clear();
    }

    /// Drop the live values of every node, keeping topology and options
    pub fn reset_values(&mut self) {
        for node in self.topology.node_weights_mut() {
            node.reset();
        }
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.indices.get(id).map(|i| &self.topology[*i])
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        let index = *self.indices.get(id)?;
        Some(&mut self.topology[index])
    }

    /// Every node currently in the graph. The order carries no dependency
    /// guarantee.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.topology.node_weights()
    }

    pub fn nodes_with_role<'a>(&'a self, role: &'a NodeRole) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes().filter(move |n| n.role() == role)
    }

    pub fn nodes_of_type<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a GraphNode> + 'a {
        self.nodes().filter(move |n| n.node_type == node_type)
    }

    pub fn set_input(&mut self, id: &str, field: &str, value: impl Into<Value>) -> Result<(), GraphError> {
        self.node_mut_or_err(id)?.set_input(field, value);
        Ok(())
    }

    pub fn set_option(&mut self, id: &str, field: &str, value: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut_or_err(id)?.set_option(field, value)
    }

    pub fn clear_option(&mut self, id: &str, field: &str) -> Result<(), GraphError> {
        self.node_mut_or_err(id)?.clear_option(field);
        Ok(())
    }

    pub fn set_position(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        self.node_mut_or_err(id)?.set_position(position);
        Ok(())
    }

    /// Connect a supplier's output field to a consumer's input field.
    ///
    /// If the input already has a supplier, that connection is replaced and
    /// the consumer's live value for the input is cleared. Connections that
    /// would close a cycle are rejected.
    pub fn connect(
        &mut self,
        supplier: &str,
        output: &str,
        consumer: &str,
        input: &str,
    ) -> Result<(), GraphError> {
        let (from, to) = self.validate_link(supplier, output, consumer, input)?;

        if has_path_connecting(&self.topology, to, from, None) {
            return Err(GraphError::CyclicConnection {
                supplier: supplier.to_string(),
                consumer: consumer.to_string(),
            });
        }

        if self.incoming_link(to, input).is_some() {
            self.disconnect(consumer, input)?;
        }

        tracing::debug!("Connecting {}:{} -> {}:{}", supplier, output, consumer, input);
        self.topology.add_edge(from, to, Link {
            output: output.to_string(),
            input: input.to_string(),
        });
        Ok(())
    }

    /// Remove the connection feeding an input field, clearing its live value.
    /// No-op if the field has no supplier.
    pub fn disconnect(&mut self, consumer: &str, input: &str) -> Result<(), GraphError> {
        let to = self.index_of(consumer)?;

        let Some(edge) = self.incoming_link(to, input) else {
            return Ok(());
        };

        tracing::debug!("Disconnecting {}:{}", consumer, input);
        self.topology.remove_edge(edge);
        self.topology[to].inputs.remove(input);
        Ok(())
    }

    /// The node and output field feeding an input field
    pub fn supplier(&self, consumer: &str, input: &str) -> Option<FieldRef> {
        let to = *self.indices.get(consumer)?;
        let edge = self.incoming_link(to, input)?;
        let (from, _) = self.topology.edge_endpoints(edge)?;
        Some(FieldRef::new(self.topology[from].id.clone(), self.topology[edge].output.clone()))
    }

    /// Every node and input field receiving an output field's value
    pub fn consumers(&self, supplier: &str, output: &str) -> Vec<FieldRef> {
        let Some(from) = self.indices.get(supplier) else {
            return Vec::new();
        };

        let mut consumers: Vec<FieldRef> = self.topology
            .edges_directed(*from, Direction::Outgoing)
            .filter(|e| e.weight().output == output)
            .map(|e| FieldRef::new(self.topology[e.target()].id.clone(), e.weight().input.clone()))
            .collect();
        consumers.sort_by(|a, b| (&a.node_id, &a.field).cmp(&(&b.node_id, &b.field)));
        consumers
    }

    /// Serialized record of one node
    pub fn record(&self, id: &str) -> Option<NodeRecord> {
        self.indices.get(id).map(|i| self.record_at(*i))
    }

    /// Export every node's record keyed by id. The result is an independent
    /// copy of the graph's state.
    pub fn dataset(&self) -> Dataset {
        self.indices
            .iter()
            .map(|(id, index)| (id.clone(), self.record_at(*index)))
            .collect()
    }

    /// Import a dataset into this graph.
    ///
    /// The import is all-or-nothing: every entry must name a registered
    /// type, every connection must validate, each supplier's output map must
    /// agree with its consumers' input maps, and the result must be acyclic.
    /// On any failure the graph is left untouched.
    pub fn set_dataset(&mut self, dataset: &Dataset) -> Result<(), GraphError> {
        let mut staged = self.clone();
        staged.import(dataset)?;
        *self = staged;
        tracing::info!("Imported {} nodes", dataset.len());
        Ok(())
    }

    fn import(&mut self, dataset: &Dataset) -> Result<(), GraphError> {
        for (id, record) in dataset {
            let node = self.construct_from_record(id.clone(), record)?;
            self.add_node(node)?;
        }

        for (id, record) in dataset {
            for (input, (supplier, output)) in &record.input {
                let (from, to) = self.validate_link(supplier, output, id, input)?;
                self.topology.add_edge(from, to, Link {
                    output: output.clone(),
                    input: input.clone(),
                });
            }
        }

        if is_cyclic_directed(&self.topology) {
            return Err(GraphError::InconsistentDataset("connections form a cycle".to_string()));
        }

        for (id, record) in dataset {
            let mut declared = record.output.clone();
            for fields in declared.values_mut().flat_map(|targets| targets.values_mut()) {
                fields.sort();
            }
            declared.retain(|_, targets| {
                targets.retain(|_, fields| !fields.is_empty());
                !targets.is_empty()
            });

            let derived = self.record(id).map(|r| r.output).unwrap_or_default();
            if declared != derived {
                return Err(GraphError::InconsistentDataset(format!(
                    "output map of node {} disagrees with its consumers' input maps",
                    id
                )));
            }
        }

        Ok(())
    }

    fn record_at(&self, index: NodeIndex) -> NodeRecord {
        let node = &self.topology[index];
        let mut record = NodeRecord::new(node.node_type.clone());
        record.position = node.position;
        record.options = node.options.clone();

        for edge in self.topology.edges_directed(index, Direction::Incoming) {
            let supplier = &self.topology[edge.source()];
            record.input.insert(
                edge.weight().input.clone(),
                (supplier.id.clone(), edge.weight().output.clone()),
            );
        }

        for edge in self.topology.edges_directed(index, Direction::Outgoing) {
            let consumer = &self.topology[edge.target()];
            record.output
                .entry(edge.weight().output.clone())
                .or_default()
                .entry(consumer.id.clone())
                .or_default()
                .push(edge.weight().input.clone());
        }
        for fields in record.output.values_mut().flat_map(|targets| targets.values_mut()) {
            fields.sort();
        }

        record
    }

    fn validate_link(
        &self,
        supplier: &str,
        output: &str,
        consumer: &str,
        input: &str,
    ) -> Result<(NodeIndex, NodeIndex), GraphError> {
        let from = self.index_of(supplier)?;
        let to = self.index_of(consumer)?;

        let supplier_node = &self.topology[from];
        let consumer_node = &self.topology[to];

        let output_field = supplier_node.schema
            .output(output)
            .ok_or_else(|| supplier_node.unknown_field("output", output))?;
        let input_field = consumer_node.schema
            .input(input)
            .ok_or_else(|| consumer_node.unknown_field("input", input))?;

        if !output_field.field_type.is_compatible(input_field.field_type) {
            return Err(GraphError::IncompatibleTypes {
                supplier: supplier.to_string(),
                output: output.to_string(),
                output_type: output_field.field_type,
                consumer: consumer.to_string(),
                input: input.to_string(),
                input_type: input_field.field_type,
            });
        }

        Ok((from, to))
    }

    fn incoming_link(&self, to: NodeIndex, input: &str) -> Option<EdgeIndex> {
        self.topology
            .edges_directed(to, Direction::Incoming)
            .find(|e| e.weight().input == input)
            .map(|e| e.id())
    }

    pub(crate) fn index_of(&self, id: &str) -> Result<NodeIndex, GraphError> {
        self.indices
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    fn node_mut_or_err(&mut self, id: &str) -> Result<&mut GraphNode, GraphError> {
        let index = self.index_of(id)?;
        Ok(&mut self.topology[index])
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.topology.node_count())
            .field("connections", &self.topology.edge_count())
            .finish()
    }
}
