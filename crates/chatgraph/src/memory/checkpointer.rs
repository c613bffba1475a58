//! Checkpointer trait and CheckpointError.
//!
//! Saves and loads checkpoints by `(thread_id, checkpoint_id)`. Aligns with
//! LangGraph `BaseCheckpointSaver`.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::config::RunnableConfig;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Saves and loads checkpoints per thread.
///
/// Implementations: `MemorySaver` (in-process), `SqliteSaver` (feature `sqlite`).
///
/// **Interaction**: Injected with `StateGraph::compile_with_checkpointer`;
/// wrapped by `SessionStore`.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Appends a checkpoint to the thread's history. Returns its id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Latest checkpoint of the thread, or the one named by `config.checkpoint_id`.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Checkpoints of the thread, newest first.
    ///
    /// `before` / `after` keep only checkpoints older / newer than the given id;
    /// `limit` applies last.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}

pub(crate) fn thread_id(config: &RunnableConfig) -> Result<&str, CheckpointError> {
    config
        .thread_id
        .as_deref()
        .ok_or(CheckpointError::ThreadIdRequired)
}

/// Applies `list` filtering to a thread history given oldest first.
pub(crate) fn list_window(
    history: Vec<CheckpointListItem>,
    limit: Option<usize>,
    before: Option<&str>,
    after: Option<&str>,
) -> Vec<CheckpointListItem> {
    let position = |id: &str| history.iter().position(|c| c.checkpoint_id == id);
    let end = before.and_then(position).unwrap_or(history.len());
    let start = after.and_then(position).map(|i| i + 1).unwrap_or(0);
    let mut items: Vec<CheckpointListItem> = history
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i >= start && *i < end)
        .map(|(_, c)| c)
        .collect();
    items.reverse();
    if let Some(n) = limit {
        items.truncate(n);
    }
    items
}
