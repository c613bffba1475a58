//! Run config: thread_id, checkpoint_id, recursion limit.
//!
//! Aligns with LangGraph's `config["configurable"]` plus `recursion_limit`.

/// Config for a single run.
///
/// When the graph has a checkpointer, `thread_id` is required.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke` / `stream` / `get_state`
/// and to `Checkpointer::put` / `get_tuple` / `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnableConfig {
    /// Conversation key.
    pub thread_id: Option<String>,
    /// Read this checkpoint instead of the latest (`get_tuple`, `get_state`).
    pub checkpoint_id: Option<String>,
    /// Max node executions per run; `DEFAULT_RECURSION_LIMIT` when `None`.
    pub recursion_limit: Option<usize>,
}

impl RunnableConfig {
    /// Config for the conversation `thread_id`.
    pub fn thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Self::default()
        }
    }

    pub fn with_checkpoint_id(mut self, checkpoint_id: impl Into<String>) -> Self {
        self.checkpoint_id = Some(checkpoint_id.into());
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }
}
