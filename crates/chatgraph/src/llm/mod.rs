//! LLM client abstraction used by the `chatbot` node.
//!
//! - `LlmClient`: one model call over the whole message log
//! - `ChatOpenAI`: OpenAI Chat Completions over HTTP
//! - `MockLlm`: scripted responses for tests
//! - `LlmError`: model call failures

mod error;
mod mock;
mod openai;

pub use error::LlmError;
pub use mock::MockLlm;
pub use openai::{ChatOpenAI, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCall};

/// Response from one model call: assistant text and the tool calls it requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// The assistant message to append to the log.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

/// Chat model: turns the message log into one assistant response.
///
/// **Interaction**: Used by `ChatbotNode`; implemented by `ChatOpenAI` and `MockLlm`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Calls the model with the full log. No retries.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}
