//! Graph node trait: one step in a StateGraph.

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// Aligns with a LangGraph node `(state) -> update`, except the node returns the
/// full state and may override routing through `Next`.
///
/// **Interaction**: Registered with `StateGraph::add_node`; run by
/// `CompiledStateGraph::invoke` / `stream`. Implemented by `ChatbotNode` and `ToolNode`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Default id of this node (e.g. `"chatbot"`, `"tools"`).
    fn id(&self) -> &str;

    /// One step: state in, (state out, next step).
    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
