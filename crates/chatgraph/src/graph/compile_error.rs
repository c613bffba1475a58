//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the edges do not describe a runnable graph.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge or path map names a node that was never added.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// `add_node` was called twice with the same id.
    #[error("duplicate node: {0}")]
    DuplicateNode(String),
    /// `START` or `END` used as a node id.
    #[error("reserved node name: {0}")]
    ReservedName(String),
    /// No `add_edge(START, ..)`.
    #[error("graph has no entry edge from START")]
    MissingEntry,
    /// A node has more than one way out (two static edges, or static plus conditional).
    #[error("node {0} has conflicting outgoing edges")]
    ConflictingEdges(String),
}
