//! Checkpoint, metadata and snapshot types.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Metadata for a single checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Position in the thread's history; starts at 0 and grows by one per checkpoint.
    pub step: u64,
    pub created_at: Option<SystemTime>,
}

/// What produced the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointSource {
    /// The run's input merged into the thread state.
    Input,
    /// A node finished.
    Loop,
    /// Written directly, e.g. `SessionStore::append`.
    Update,
}

/// One checkpoint: the state after a step plus the node that runs next.
///
/// **Interaction**: Produced by `CompiledStateGraph` runs and `SessionStore`;
/// stored by `Checkpointer::put`, returned by `get_tuple`.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    pub id: String,
    /// Milliseconds since the Unix epoch, as text.
    pub ts: String,
    pub values: S,
    /// Node to run next; `None` when the run ended here.
    pub next: Option<String>,
    pub metadata: CheckpointMetadata,
}

impl<S> Checkpoint<S> {
    /// Builds a checkpoint of `state` stamped with the current time.
    pub fn from_state(state: S, source: CheckpointSource, step: u64) -> Self {
        let now = SystemTime::now();
        let ts = now
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
            .to_string();
        Self {
            id: format!("{ts}-{step}"),
            ts,
            values: state,
            next: None,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }

    pub fn with_next(mut self, next: Option<String>) -> Self {
        self.next = next;
        self
    }
}

/// Item returned by `Checkpointer::list`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}

/// State of a thread as returned by `CompiledStateGraph::get_state`.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    pub values: S,
    /// Node that would run next; `None` when the last run reached END.
    pub next: Option<String>,
    pub checkpoint_id: String,
    pub metadata: CheckpointMetadata,
}
