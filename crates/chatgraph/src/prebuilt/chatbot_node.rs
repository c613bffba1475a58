//! Chatbot node: send the log to the model, append its answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::LlmClient;
use crate::prebuilt::CHATBOT_NODE;
use crate::state::ChatState;

/// Model-invocation step of a chat turn.
///
/// Reads `state.messages`, calls the model once and appends exactly one
/// assistant message (final text, or tool calls for the `tools` node). Model
/// errors abort the run.
///
/// **Interaction**: Implements `Node<ChatState>`; holds any `LlmClient`
/// (`ChatOpenAI`, `MockLlm`). Routed by `tools_condition` afterwards.
pub struct ChatbotNode {
    llm: Arc<dyn LlmClient>,
}

impl ChatbotNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Node<ChatState> for ChatbotNode {
    fn id(&self) -> &str {
        CHATBOT_NODE
    }

    async fn run(&self, state: ChatState) -> Result<(ChatState, Next), AgentError> {
        let response = self.llm.invoke(&state.messages).await?;
        debug!(
            tool_calls = response.tool_calls.len(),
            content_len = response.content.len(),
            "model answered"
        );
        let mut messages = state.messages;
        messages.push(response.into_message());
        Ok((ChatState { messages }, Next::Continue))
    }
}
