//! Graph state types.
//!
//! `GraphState` is what a `StateGraph` needs from its state: cloneable, sendable,
//! and a reducer that folds a new input into state restored from a checkpoint.
//! `ChatState` is the state of every chat graph in this crate.

use serde::{Deserialize, Serialize};

use crate::message::{add_messages, close_pending_tool_calls, Message, Role};

/// State that can flow through a `StateGraph`.
///
/// `merge` is called once per run when the graph has a checkpointer: `self` is
/// the state loaded for the thread and `input` is what the caller passed to
/// `invoke` / `stream`.
pub trait GraphState: Clone + Send + Sync + 'static {
    fn merge(self, input: Self) -> Self;
}

/// State of a chat graph: the conversation log.
///
/// **Interaction**: Read by `ChatbotNode` (whole log goes to the model) and
/// `ToolNode` (pending tool calls); both only ever append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
}

impl ChatState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Input state for one user turn.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self::new(vec![Message::user(content)])
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl GraphState for ChatState {
    /// Appends the input. Tool calls the saved log left open are answered with
    /// error tool messages first, unless the input itself is tool messages.
    fn merge(self, input: Self) -> Self {
        let saved = if input.messages.iter().any(|m| m.role != Role::Tool) {
            close_pending_tool_calls(self.messages)
        } else {
            self.messages
        };
        Self {
            messages: add_messages(saved, input.messages),
        }
    }
}
