//! Errors raised while running a graph.
//!
//! - `AgentError`: node execution, routing, step limit, checkpoint I/O
//!
//! Model, tool, checkpoint and compile errors have their own enums next to the
//! code that produces them; `AgentError` wraps the ones that abort a run.

use thiserror::Error;

use crate::llm::LlmError;
use crate::memory::CheckpointError;

/// Error that aborts a graph run (and therefore the current turn).
///
/// Tool failures are not in here: the `tools` node turns them into
/// error-content tool messages so the model can react.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Node failed for a reason not covered below.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Model call failed (transport, auth, rate limit, bad response).
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    /// The run executed this many nodes without reaching END.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),

    /// Loading or saving a checkpoint failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// A router or `Next::Node` named a node that is not in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The state does not allow the requested step (e.g. tools node with no pending calls).
    #[error("invalid state: {0}")]
    InvalidState(String),
}
