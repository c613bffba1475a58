//! Session store: per-conversation message logs on top of a checkpointer.

use std::sync::Arc;

use tracing::debug;

use crate::memory::checkpoint::{Checkpoint, CheckpointSource};
use crate::memory::checkpointer::{CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::message::{add_messages, Message};
use crate::state::ChatState;

/// Keyed mapping from session key to that session's message log.
///
/// Reads the latest checkpoint of the thread with the same key, so it sees what
/// a checkpointed chat graph saved, and writes through the same checkpointer.
/// No eviction, no expiry.
///
/// **Interaction**: Shares the `Arc<dyn Checkpointer<ChatState>>` passed to
/// `StateGraph::compile_with_checkpointer`.
#[derive(Clone)]
pub struct SessionStore {
    checkpointer: Arc<dyn Checkpointer<ChatState>>,
}

impl SessionStore {
    pub fn new(checkpointer: Arc<dyn Checkpointer<ChatState>>) -> Self {
        Self { checkpointer }
    }

    /// The stored log, or an empty one if the session has none yet.
    pub async fn get(&self, key: &str) -> Result<Vec<Message>, CheckpointError> {
        Ok(self
            .checkpointer
            .get_tuple(&RunnableConfig::thread(key))
            .await?
            .map(|(checkpoint, _)| checkpoint.values.messages)
            .unwrap_or_default())
    }

    /// Appends `messages` to the session's log; returns the new length.
    pub async fn append(&self, key: &str, messages: Vec<Message>) -> Result<usize, CheckpointError> {
        let config = RunnableConfig::thread(key);
        let (log, step) = match self.checkpointer.get_tuple(&config).await? {
            Some((checkpoint, metadata)) => (checkpoint.values.messages, metadata.step + 1),
            None => (Vec::new(), 0),
        };
        let state = ChatState::new(add_messages(log, messages));
        let len = state.messages.len();
        let checkpoint = Checkpoint::from_state(state, CheckpointSource::Update, step);
        self.checkpointer.put(&config, &checkpoint).await?;
        debug!(session = key, len, "session appended");
        Ok(len)
    }
}
