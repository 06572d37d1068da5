use crate::graph::Graph;
use helpercore::{GraphError, NodeContext, NodeStatus, Value, WalkEventKind, WalkId};
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of a successful walk
#[derive(Debug, Clone)]
pub struct WalkSummary {
    pub walk_id: WalkId,
    /// Bootstrapper nodes the walk started from
    pub bootstrappers: usize,
    /// Number of times a node ran `process()`
    pub processed: usize,
}

/// Pending work in a depth-first cascade
enum Step {
    Propagate(NodeIndex),
    Deliver {
        target: NodeIndex,
        fields: Vec<String>,
        value: Value,
    },
}

impl Graph {
    /// Propagate from every bootstrapper node.
    ///
    /// Each bootstrapper's cascade runs to completion or to its first
    /// processing failure; a failure stops only that cascade. Outputs already
    /// computed upstream of a failure are kept. If any cascade failed, the
    /// first failure is returned after all cascades have run.
    pub async fn walk(&mut self) -> Result<WalkSummary, GraphError> {
        let walk_id = WalkId::new_v4();
        let start_time = Instant::now();

        let seeds: Vec<NodeIndex> = self.topology
            .node_indices()
            .filter(|i| self.topology[*i].is_bootstrapper())
            .collect();

        self.events.publish(walk_id, WalkEventKind::Started { bootstrappers: seeds.len() });
        tracing::info!("Starting walk {} from {} bootstrappers", walk_id, seeds.len());

        let mut processed = 0;
        let mut first_failure = None;

        for seed in &seeds {
            match self.cascade(walk_id, *seed).await {
                Ok(count) => processed += count,
                Err(e) => {
                    tracing::error!("Cascade from {} aborted: {}", self.topology[*seed].id, e);
                    first_failure.get_or_insert(e);
                }
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        self.events.publish(walk_id, WalkEventKind::Finished {
            success: first_failure.is_none(),
            processed,
            duration_ms,
        });

        match first_failure {
            Some(e) => Err(e),
            None => Ok(WalkSummary {
                walk_id,
                bootstrappers: seeds.len(),
                processed,
            }),
        }
    }

    /// Propagate a single node and everything downstream of it
    pub async fn propagate(&mut self, id: &str) -> Result<usize, GraphError> {
        let index = self.index_of(id)?;
        self.cascade(WalkId::new_v4(), index).await
    }

    /// Depth-first push evaluation driven by an explicit work stack.
    ///
    /// A consumer's whole cascade finishes before the next consumer of the
    /// same supplier receives its value. Connections are acyclic, so every
    /// cascade terminates.
    async fn cascade(&mut self, walk_id: WalkId, start: NodeIndex) -> Result<usize, GraphError> {
        let mut processed = 0;
        let mut stack = vec![Step::Propagate(start)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Deliver { target, fields, value } => {
                    let node = &mut self.topology[target];
                    for field in fields {
                        node.set_input(field, value.clone());
                    }
                }
                Step::Propagate(index) => {
                    let status = self.topology[index].status();
                    if status != NodeStatus::Complete {
                        tracing::trace!("Node {} is {}, not propagating", self.topology[index].id, status);
                        self.events.publish(walk_id, WalkEventKind::NodeWaiting {
                            node_id: self.topology[index].id.clone(),
                            status,
                        });
                        continue;
                    }

                    self.process_node(walk_id, index).await?;
                    processed += 1;

                    let mut next = self.fan_out(index);
                    next.reverse();
                    stack.extend(next);
                }
            }
        }

        Ok(processed)
    }

    /// Deliveries for every connected output of a freshly processed node,
    /// grouped per consumer and in cascade order
    fn fan_out(&self, index: NodeIndex) -> Vec<Step> {
        let node = &self.topology[index];
        let mut steps = Vec::new();

        for output in &node.schema.outputs {
            let mut targets: BTreeMap<&str, (NodeIndex, Vec<String>)> = BTreeMap::new();
            for edge in self.topology.edges_directed(index, Direction::Outgoing) {
                if edge.weight().output != output.name {
                    continue;
                }
                let consumer = &self.topology[edge.target()];
                targets
                    .entry(consumer.id.as_str())
                    .or_insert_with(|| (edge.target(), Vec::new()))
                    .1
                    .push(edge.weight().input.clone());
            }

            if targets.is_empty() {
                continue;
            }

            let value = node.outputs.get(&output.name).cloned().unwrap_or(Value::Null);
            for (_, (target, mut fields)) in targets {
                fields.sort();
                steps.push(Step::Deliver {
                    target,
                    fields,
                    value: value.clone(),
                });
                steps.push(Step::Propagate(target));
            }
        }

        steps
    }

    async fn process_node(&mut self, walk_id: WalkId, index: NodeIndex) -> Result<(), GraphError> {
        let node = &mut self.topology[index];
        node.outputs.clear();

        let behavior = Arc::clone(&node.behavior);
        let node_id = node.id.clone();
        let node_type = node.node_type.clone();
        let ctx = NodeContext {
            node_id: node_id.clone(),
            inputs: node.inputs.clone(),
            options: node.resolved_options(),
            events: self.events.reporter(walk_id, node_id.clone()),
        };

        self.events.publish(walk_id, WalkEventKind::NodeStarted {
            node_id: node_id.clone(),
            node_type: node_type.clone(),
        });
        tracing::debug!("Processing node {} ({})", node_id, node_type);

        let start = Instant::now();
        let result = behavior.process(ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(output) => {
                let node = &mut self.topology[index];
                let mut outputs = HashMap::new();
                for (field, value) in output.outputs {
                    if value.is_null() {
                        continue;
                    }
                    if node.schema.output(&field).is_none() {
                        tracing::warn!("Node {} produced undeclared output '{}', ignored", node_id, field);
                        continue;
                    }
                    outputs.insert(field, value);
                }
                node.outputs = outputs;

                self.events.publish(walk_id, WalkEventKind::NodeCompleted { node_id, duration_ms });
                Ok(())
            }
            Err(e) => {
                tracing::error!("Node {} failed: {}", node_id, e);
                self.events.publish(walk_id, WalkEventKind::NodeFailed {
                    node_id: node_id.clone(),
                    error: e.to_string(),
                });
                Err(GraphError::Processing {
                    node_id,
                    node_type,
                    source: e,
                })
            }
        }
    }
}
