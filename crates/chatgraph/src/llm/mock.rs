//! Mock LLM for tests and demos.
//!
//! Returns a fixed reply, or replays a script of responses one per call; records
//! every log it is called with so tests can assert on what the model saw.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmError, LlmResponse};
use crate::message::{Message, ToolCall};

enum Reply {
    /// Same response on every call.
    Fixed(LlmResponse),
    /// Front of the queue per call; the last entry repeats once the rest are used.
    Script(VecDeque<LlmResponse>),
    /// Built from the log on every call.
    Func(Box<dyn Fn(&[Message]) -> LlmResponse + Send + Sync>),
    Fail(LlmError),
}

/// Mock LLM: fixed or scripted responses.
///
/// **Interaction**: Implements `LlmClient`; used by `ChatbotNode` in tests.
pub struct MockLlm {
    reply: Mutex<Reply>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers `content` with no tool calls (END path).
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fixed(LlmResponse::text(content)))
    }

    /// Replays `responses` in order; the last one repeats.
    pub fn scripted(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        Self::with_reply(Reply::Script(responses.into_iter().collect()))
    }

    /// First call asks for one `tavily_search` call with `query`; later calls answer `answer`.
    pub fn first_tools_then_end(query: &str, answer: impl Into<String>) -> Self {
        let args = serde_json::json!({ "query": query }).to_string();
        Self::scripted([
            LlmResponse {
                content: String::new(),
                tool_calls: vec![ToolCall::new("call-1", "tavily_search", args)],
            },
            LlmResponse::text(answer),
        ])
    }

    /// Computes the response from the log.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Message]) -> LlmResponse + Send + Sync + 'static,
    {
        Self::with_reply(Reply::Func(Box::new(f)))
    }

    /// Every call fails with `error`.
    pub fn failing(error: LlmError) -> Self {
        Self::with_reply(Reply::Fail(error))
    }

    /// Logs passed to `invoke`, in call order.
    pub fn seen_messages(&self) -> Vec<Vec<Message>> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(messages.to_vec());
        }
        let mut reply = self
            .reply
            .lock()
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        match &mut *reply {
            Reply::Fixed(r) => Ok(r.clone()),
            Reply::Script(queue) => {
                let next = if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
                next.ok_or_else(|| LlmError::EmptyResponse.into())
            }
            Reply::Func(f) => Ok((**f)(messages)),
            Reply::Fail(e) => Err(e.clone().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_repeats_last() {
        let llm = MockLlm::scripted([LlmResponse::text("a"), LlmResponse::text("b")]);
        let log = [Message::user("x")];
        assert_eq!(llm.invoke(&log).await.unwrap().content, "a");
        assert_eq!(llm.invoke(&log).await.unwrap().content, "b");
        assert_eq!(llm.invoke(&log).await.unwrap().content, "b");
        assert_eq!(llm.call_count(), 3);
    }

    #[tokio::test]
    async fn failing_surfaces_llm_error() {
        let llm = MockLlm::failing(LlmError::Auth("bad key".into()));
        let err = llm.invoke(&[Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(LlmError::Auth(_))));
    }
}
