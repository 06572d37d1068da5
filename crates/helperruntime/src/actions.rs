use crate::graph::Graph;
use helpercore::{FieldRef, GraphError, NodeId, NodeRecord, Position};
use uuid::Uuid;

/// A reversible graph edit
pub trait Action: Send + Sync {
    /// Apply the effects of this action
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError>;
    
    /// Undo the effects of this action
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError>;
    
    /// Short name for logs
    fn label(&self) -> &'static str;
}

/// Create a node of a given type at a position.
///
/// The id is fixed when the action is built so that redoing it recreates the
/// very same node.
#[derive(Debug, Clone)]
pub struct Create {
    node_type: String,
    position: Position,
    id: NodeId,
}

impl Create {
    pub fn new(node_type: impl Into<String>, position: Position) -> Self {
        Self {
            node_type: node_type.into(),
            position,
            id: Uuid::new_v4().to_string(),
        }
    }
    
    /// Id the created node receives
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Action for Create {
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError> {
        let mut node = graph.construct(&self.node_type, self.id.clone())?;
        node.set_position(self.position);
        graph.add_node(node)
    }
    
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.remove_node(&self.id);
        Ok(())
    }
    
    fn label(&self) -> &'static str {
        "create"
    }
}

/// Delete a node, remembering its full record so every connection that
/// touched it can be restored on both ends
#[derive(Debug, Clone)]
pub struct Delete {
    id: NodeId,
    record: NodeRecord,
}

impl Delete {
    pub fn new(graph: &Graph, id: &str) -> Result<Self, GraphError> {
        let record = graph.record(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        Ok(Self {
            id: id.to_string(),
            record,
        })
    }
}

impl Action for Delete {
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.remove_node(&self.id);
        Ok(())
    }
    
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError> {
        let node = graph.construct_from_record(self.id.clone(), &self.record)?;
        graph.add_node(node)?;
        
        for (input, (supplier, output)) in &self.record.input {
            graph.connect(supplier, output, &self.id, input)?;
        }
        
        for (output, consumers) in &self.record.output {
            for (consumer, inputs) in consumers {
                for input in inputs {
                    graph.connect(&self.id, output, consumer, input)?;
                }
            }
        }
        
        Ok(())
    }
    
    fn label(&self) -> &'static str {
        "delete"
    }
}

/// Move a node to a new position
#[derive(Debug, Clone)]
pub struct Move {
    id: NodeId,
    from: Position,
    to: Position,
}

impl Move {
    pub fn new(graph: &Graph, id: &str, to: Position) -> Result<Self, GraphError> {
        let node = graph.get_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        Ok(Self {
            id: id.to_string(),
            from: node.position(),
            to,
        })
    }
}

impl Action for Move {
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.set_position(&self.id, self.to)
    }
    
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.set_position(&self.id, self.from)
    }
    
    fn label(&self) -> &'static str {
        "move"
    }
}

/// Point a consumer's input at a new supplier, or at nothing
#[derive(Debug, Clone)]
pub struct Connect {
    consumer: FieldRef,
    new_supplier: Option<FieldRef>,
    old_supplier: Option<FieldRef>,
}

impl Connect {
    pub fn new(graph: &Graph, consumer: FieldRef, supplier: Option<FieldRef>) -> Result<Self, GraphError> {
        if !graph.contains(&consumer.node_id) {
            return Err(GraphError::NodeNotFound(consumer.node_id));
        }
        let old_supplier = graph.supplier(&consumer.node_id, &consumer.field);
        Ok(Self {
            consumer,
            new_supplier: supplier,
            old_supplier,
        })
    }
    
    fn apply(&self, graph: &mut Graph, supplier: Option<&FieldRef>) -> Result<(), GraphError> {
        match supplier {
            Some(supplier) => graph.connect(
                &supplier.node_id,
                &supplier.field,
                &self.consumer.node_id,
                &self.consumer.field,
            ),
            None => graph.disconnect(&self.consumer.node_id, &self.consumer.field),
        }
    }
}

impl Action for Connect {
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError> {
        self.apply(graph, self.new_supplier.as_ref())
    }
    
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError> {
        self.apply(graph, self.old_supplier.as_ref())
    }
    
    fn label(&self) -> &'static str {
        "connect"
    }
}

/// Change an option value
#[derive(Debug, Clone)]
pub struct SetOption {
    id: NodeId,
    field: String,
    /// Value stored in the record before the edit; `None` if it was unset
    old_value: Option<String>,
    new_value: String,
}

impl SetOption {
    pub fn new(graph: &Graph, id: &str, field: &str, value: impl Into<String>) -> Result<Self, GraphError> {
        let node = graph.get_node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        if node.schema().option(field).is_none() {
            return Err(GraphError::UnknownField {
                node_id: id.to_string(),
                kind: "option",
                field: field.to_string(),
            });
        }
        Ok(Self {
            id: id.to_string(),
            field: field.to_string(),
            old_value: node.explicit_option(field).map(str::to_string),
            new_value: value.into(),
        })
    }
}

impl Action for SetOption {
    fn execute(&self, graph: &mut Graph) -> Result<(), GraphError> {
        graph.set_option(&self.id, &self.field, self.new_value.clone())
    }
    
    fn reverse(&self, graph: &mut Graph) -> Result<(), GraphError> {
        match &self.old_value {
            Some(value) => graph.set_option(&self.id, &self.field, value.clone()),
            None => graph.clear_option(&self.id, &self.field),
        }
    }
    
    fn label(&self) -> &'static str {
        "set-option"
    }
}
