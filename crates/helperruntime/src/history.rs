use crate::actions::Action;
use crate::graph::Graph;
use helpercore::GraphError;

/// Linear undo/redo stack of graph edits
#[derive(Default)]
pub struct History {
    actions: Vec<Box<dyn Action>>,
    /// Number of actions currently applied
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Record an already executed action, discarding anything that could
    /// still have been redone
    pub fn record(&mut self, action: Box<dyn Action>) {
        self.actions.truncate(self.cursor);
        tracing::debug!("Recording {} action", action.label());
        self.actions.push(action);
        self.cursor += 1;
    }
    
    /// Execute an action and record it if it succeeded
    pub fn perform(&mut self, graph: &mut Graph, action: Box<dyn Action>) -> Result<(), GraphError> {
        action.execute(graph)?;
        self.record(action);
        Ok(())
    }
    
    /// Reverse the latest applied action. Returns false if there was none.
    pub fn undo(&mut self, graph: &mut Graph) -> Result<bool, GraphError> {
        if self.cursor == 0 {
            return Ok(false);
        }
        
        let action = &self.actions[self.cursor - 1];
        tracing::debug!("Undoing {} action", action.label());
        action.reverse(graph)?;
        self.cursor -= 1;
        Ok(true)
    }
    
    /// Re-execute the next undone action. Returns false if there was none.
    pub fn redo(&mut self, graph: &mut Graph) -> Result<bool, GraphError> {
        let Some(action) = self.actions.get(self.cursor) else {
            return Ok(false);
        };
        
        tracing::debug!("Redoing {} action", action.label());
        action.execute(graph)?;
        self.cursor += 1;
        Ok(true)
    }
    
    /// Forget all actions
    pub fn forget(&mut self) {
        self.actions.clear();
        self.cursor = 0;
    }
    
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }
    
    pub fn can_redo(&self) -> bool {
        self.cursor < self.actions.len()
    }
    
    pub fn len(&self) -> usize {
        self.actions.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
