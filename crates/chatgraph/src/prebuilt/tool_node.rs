//! Tools node: run each pending tool call in request order, append one tool message per call.
//!
//! A failing call (unknown tool, malformed arguments, tool error) becomes an error
//! tool message so the model can react; it never aborts the run.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::{pending_tool_calls, Message, ToolCall};
use crate::prebuilt::TOOLS_NODE;
use crate::state::ChatState;
use crate::tool_source::{ToolSource, ToolSourceError};

/// Tool-dispatch step of a chat turn.
///
/// **Interaction**: Implements `Node<ChatState>`; calls `ToolSource::call_tool`
/// for each entry of `pending_tool_calls(&state.messages)`.
pub struct ToolNode {
    tools: Arc<dyn ToolSource>,
}

impl ToolNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self { tools }
    }

    async fn dispatch(&self, call: &ToolCall) -> Message {
        let result = match parse_arguments(&call.arguments) {
            Ok(args) => self.tools.call_tool(&call.name, args).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(content) => {
                info!(tool = %call.name, call_id = %call.id, "tool call succeeded");
                Message::tool(&call.id, &call.name, content.text)
            }
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call failed");
                Message::tool_error(
                    &call.id,
                    &call.name,
                    format!("Error: {e}\n Please fix your mistakes."),
                )
            }
        }
    }
}

/// Empty arguments mean `{}`; anything else must be a JSON object.
fn parse_arguments(raw: &str) -> Result<Value, ToolSourceError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ Value::Object(_)) => Ok(v),
        Ok(other) => Err(ToolSourceError::InvalidInput(format!(
            "arguments must be a JSON object, got {other}"
        ))),
        Err(e) => Err(ToolSourceError::InvalidInput(format!(
            "arguments are not valid JSON: {e}"
        ))),
    }
}

#[async_trait]
impl Node<ChatState> for ToolNode {
    fn id(&self) -> &str {
        TOOLS_NODE
    }

    async fn run(&self, state: ChatState) -> Result<(ChatState, Next), AgentError> {
        let pending: Vec<ToolCall> = pending_tool_calls(&state.messages)
            .into_iter()
            .cloned()
            .collect();
        if pending.is_empty() {
            return Err(AgentError::InvalidState(
                "tools node ran without pending tool calls".to_string(),
            ));
        }
        let mut messages = state.messages;
        for call in &pending {
            messages.push(self.dispatch(call).await);
        }
        Ok((ChatState { messages }, Next::Continue))
    }
}
