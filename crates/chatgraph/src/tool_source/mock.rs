//! Mock tool source for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec, TAVILY_TOOL_NAME};

/// Mock tool source: registered tools answer with fixed text.
///
/// **Interaction**: Implements `ToolSource`; used with `ToolNode` in tests.
/// Every call is recorded as `(name, arguments)`.
pub struct MockToolSource {
    tools: Vec<ToolSpec>,
    replies: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl Default for MockToolSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolSource {
    /// No tools; every call is `NotFound`.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            replies: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// One `tavily_search` tool that always returns `text`.
    pub fn search_returning(text: impl Into<String>) -> Self {
        Self::new().with_tool(TAVILY_TOOL_NAME, text)
    }

    /// Registers `name`, answering every call with `text`.
    pub fn with_tool(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let name = name.into();
        self.tools.push(Self::spec_for(&name));
        self.replies.insert(name, Ok(text.into()));
        self
    }

    /// Registers `name`, failing every call with an API error carrying `message`.
    pub fn with_failing_tool(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        self.tools.push(Self::spec_for(&name));
        self.replies.insert(name, Err(message.into()));
        self
    }

    fn spec_for(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            description: Some(format!("mock {name}")),
            input_schema: json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        }
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((name.to_string(), arguments));
        }
        match self.replies.get(name) {
            Some(Ok(text)) => Ok(ToolCallContent { text: text.clone() }),
            Some(Err(message)) => Err(ToolSourceError::Api(message.clone())),
            None => Err(ToolSourceError::NotFound(name.to_string())),
        }
    }
}
