//! Walk progress, broadcast to whoever subscribes to a graph.

use crate::{NodeId, NodeStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

pub type WalkId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkEvent {
    pub walk_id: WalkId,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: WalkEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalkEventKind {
    Started {
        bootstrappers: usize,
    },
    /// `processed` counts `process()` runs across every cascade
    Finished {
        success: bool,
        processed: usize,
        duration_ms: u64,
    },
    NodeStarted {
        node_id: NodeId,
        node_type: String,
    },
    NodeCompleted {
        node_id: NodeId,
        duration_ms: u64,
    },
    /// Reached, but not every required input was present
    NodeWaiting {
        node_id: NodeId,
        status: NodeStatus,
    },
    NodeFailed {
        node_id: NodeId,
        error: String,
    },
    Note {
        node_id: NodeId,
        level: NoteLevel,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    Info,
    Warning,
}

/// Lets a running node attach notes to the walk it belongs to
#[derive(Clone)]
pub struct NodeReporter {
    walk_id: WalkId,
    node_id: NodeId,
    sender: broadcast::Sender<WalkEvent>,
}

impl NodeReporter {
    fn note(&self, level: NoteLevel, message: String) {
        let _ = self.sender.send(WalkEvent {
            walk_id: self.walk_id,
            at: Utc::now(),
            kind: WalkEventKind::Note {
                node_id: self.node_id.clone(),
                level,
                message,
            },
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.note(NoteLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.note(NoteLevel::Warning, message.into());
    }
}

/// Broadcast channel shared by a graph and everyone watching it. Sends with
/// no subscriber are dropped.
pub struct EventBus {
    sender: broadcast::Sender<WalkEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalkEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, walk_id: WalkId, kind: WalkEventKind) {
        let _ = self.sender.send(WalkEvent {
            walk_id,
            at: Utc::now(),
            kind,
        });
    }

    pub fn reporter(&self, walk_id: WalkId, node_id: impl Into<NodeId>) -> NodeReporter {
        NodeReporter {
            walk_id,
            node_id: node_id.into(),
            sender: self.sender.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
