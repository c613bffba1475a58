//! Compiled state graph: immutable, supports invoke, stream and get_state.
//!
//! Built by `StateGraph::compile`. A run starts at the node after `START`; after
//! each node the returned `Next` (or, for `Next::Continue`, the node's outgoing
//! edge) picks the next node until END. Every run is bounded by a recursion limit.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::memory::{
    Checkpoint, CheckpointError, CheckpointSource, Checkpointer, RunnableConfig, StateSnapshot,
};
use crate::state::GraphState;

use super::state_graph::Branch;
use super::{Next, Node, END};

/// Node executions allowed per run when `RunnableConfig::recursion_limit` is unset.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// What `stream` yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamMode {
    /// One event per node, carrying the node id and the state it produced.
    #[default]
    Updates,
    /// The full state: once for the input, then after every node.
    Values,
}

/// One item of a graph stream.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    Updates { node: String, state: S },
    Values(S),
}

impl<S> StreamEvent<S> {
    pub fn state(&self) -> &S {
        match self {
            StreamEvent::Updates { state, .. } => state,
            StreamEvent::Values(state) => state,
        }
    }

    pub fn into_state(self) -> S {
        match self {
            StreamEvent::Updates { state, .. } => state,
            StreamEvent::Values(state) => state,
        }
    }

    /// Node that produced this event; `None` for value events.
    pub fn node(&self) -> Option<&str> {
        match self {
            StreamEvent::Updates { node, .. } => Some(node),
            StreamEvent::Values(_) => None,
        }
    }
}

/// Compiled graph: immutable structure, supports invoke and stream.
///
/// **Interaction**: Built from `StateGraph`; callers use `invoke(state, config)`,
/// `stream(state, config, mode)` and, with a checkpointer, `get_state(config)`.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) node_order: Vec<String>,
    pub(super) entry: String,
    pub(super) edges: HashMap<String, String>,
    pub(super) branches: HashMap<String, Branch<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
}

enum RunPhase<S> {
    Start(S),
    Step { state: S, node: String },
    Finished,
}

/// One in-flight run; advanced one event at a time by `stream`.
struct Run<'g, S> {
    graph: &'g CompiledStateGraph<S>,
    config: RunnableConfig,
    mode: StreamMode,
    limit: usize,
    executed: usize,
    /// Checkpoint step counter; continues from the thread's last checkpoint.
    step: u64,
    phase: RunPhase<S>,
}

impl<'g, S> Run<'g, S>
where
    S: GraphState,
{
    async fn advance(&mut self) -> Result<Option<StreamEvent<S>>, AgentError> {
        loop {
            match std::mem::replace(&mut self.phase, RunPhase::Finished) {
                RunPhase::Finished => return Ok(None),
                RunPhase::Start(input) => {
                    let state = self.initial_state(input).await?;
                    let entry = self.graph.entry.clone();
                    self.save(&state, CheckpointSource::Input, Some(entry.as_str()))
                        .await?;
                    self.phase = RunPhase::Step {
                        state: state.clone(),
                        node: entry,
                    };
                    if self.mode == StreamMode::Values {
                        return Ok(Some(StreamEvent::Values(state)));
                    }
                }
                RunPhase::Step { state, node } => {
                    if self.executed >= self.limit {
                        warn!(limit = self.limit, node = %node, "recursion limit reached");
                        return Err(AgentError::RecursionLimit(self.limit));
                    }
                    let runner = self
                        .graph
                        .nodes
                        .get(&node)
                        .ok_or_else(|| AgentError::NodeNotFound(node.clone()))?;
                    debug!(node = %node, step = self.executed, "running node");
                    let (state, next) = runner.run(state).await?;
                    self.executed += 1;

                    let successor = self.graph.successor(&node, &state, next)?;
                    self.save(&state, CheckpointSource::Loop, successor.as_deref())
                        .await?;
                    if let Some(next_node) = successor {
                        self.phase = RunPhase::Step {
                            state: state.clone(),
                            node: next_node,
                        };
                    }
                    let event = match self.mode {
                        StreamMode::Updates => StreamEvent::Updates { node, state },
                        StreamMode::Values => StreamEvent::Values(state),
                    };
                    return Ok(Some(event));
                }
            }
        }
    }

    /// Input merged into the thread's latest checkpoint (or the input alone).
    async fn initial_state(&mut self, input: S) -> Result<S, AgentError> {
        let Some(checkpointer) = &self.graph.checkpointer else {
            return Ok(input);
        };
        if self.config.thread_id.is_none() {
            return Err(CheckpointError::ThreadIdRequired.into());
        }
        match checkpointer.get_tuple(&self.config).await? {
            Some((checkpoint, metadata)) => {
                self.step = metadata.step + 1;
                Ok(checkpoint.values.merge(input))
            }
            None => Ok(input),
        }
    }

    async fn save(
        &mut self,
        state: &S,
        source: CheckpointSource,
        next: Option<&str>,
    ) -> Result<(), AgentError> {
        let Some(checkpointer) = &self.graph.checkpointer else {
            return Ok(());
        };
        let checkpoint = Checkpoint::from_state(state.clone(), source, self.step)
            .with_next(next.map(str::to_string));
        let save_config = RunnableConfig {
            checkpoint_id: None,
            ..self.config.clone()
        };
        let id = checkpointer.put(&save_config, &checkpoint).await?;
        debug!(checkpoint_id = %id, step = self.step, "checkpoint saved");
        self.step += 1;
        Ok(())
    }
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    /// Runs the graph to completion and returns the final state.
    ///
    /// With a checkpointer, `config.thread_id` is required and the run continues
    /// that thread's conversation.
    pub async fn invoke(&self, input: S, config: Option<&RunnableConfig>) -> Result<S, AgentError> {
        let mut events = self.stream(input, config, StreamMode::Values);
        let mut last = None;
        while let Some(event) = events.next().await {
            last = Some(event?.into_state());
        }
        last.ok_or_else(|| AgentError::ExecutionFailed("graph produced no state".into()))
    }

    /// Runs the graph, yielding one event per step (see `StreamMode`).
    ///
    /// The stream ends after END, or after yielding the first error.
    pub fn stream<'g>(
        &'g self,
        input: S,
        config: Option<&RunnableConfig>,
        mode: StreamMode,
    ) -> BoxStream<'g, Result<StreamEvent<S>, AgentError>> {
        let config = config.cloned().unwrap_or_default();
        let run = Run {
            graph: self,
            limit: config.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT),
            config,
            mode,
            executed: 0,
            step: 0,
            phase: RunPhase::Start(input),
        };
        futures::stream::unfold(run, |mut run| async move {
            match run.advance().await {
                Ok(Some(event)) => Some((Ok(event), run)),
                Ok(None) => None,
                Err(e) => {
                    run.phase = RunPhase::Finished;
                    Some((Err(e), run))
                }
            }
        })
        .boxed()
    }

    /// Latest (or `config.checkpoint_id`) snapshot of a thread; `None` for an unknown thread.
    pub async fn get_state(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<StateSnapshot<S>>, AgentError> {
        let checkpointer = self.checkpointer.as_ref().ok_or_else(|| {
            AgentError::ExecutionFailed("graph was compiled without a checkpointer".into())
        })?;
        if config.thread_id.is_none() {
            return Err(CheckpointError::ThreadIdRequired.into());
        }
        Ok(checkpointer
            .get_tuple(config)
            .await?
            .map(|(checkpoint, metadata)| StateSnapshot {
                checkpoint_id: checkpoint.id,
                next: checkpoint.next,
                values: checkpoint.values,
                metadata,
            }))
    }

    pub fn has_checkpointer(&self) -> bool {
        self.checkpointer.is_some()
    }

    /// Node ids in the order they were added.
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    /// Next node after `node`, or `None` for END.
    fn successor(&self, node: &str, state: &S, next: Next) -> Result<Option<String>, AgentError> {
        let target = match next {
            Next::End => return Ok(None),
            Next::Node(id) => id,
            Next::Continue => {
                if let Some(branch) = self.branches.get(node) {
                    let route = (branch.router)(state);
                    match &branch.path_map {
                        Some(map) => map
                            .get(&route)
                            .cloned()
                            .ok_or(AgentError::NodeNotFound(route))?,
                        None => route,
                    }
                } else if let Some(to) = self.edges.get(node) {
                    to.clone()
                } else {
                    return Ok(None);
                }
            }
        };
        debug!(from = node, to = %target, "route");
        if target == END {
            Ok(None)
        } else if self.nodes.contains_key(&target) {
            Ok(Some(target))
        } else {
            Err(AgentError::NodeNotFound(target))
        }
    }
}
