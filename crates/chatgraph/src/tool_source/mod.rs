//! Tool source abstraction: list tools and call a tool.
//!
//! The `tools` node depends on `ToolSource` instead of a concrete tool; the model
//! is bound to the specs from `list_tools`. Implementations: `TavilySearch` (web
//! search over HTTP) and `MockToolSource` (tests).

mod mock;
mod tavily;

pub use mock::MockToolSource;
pub use tavily::{TavilySearch, TAVILY_DEFAULT_BASE_URL, TAVILY_TOOL_NAME};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification handed to the model.
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; passed to
/// `ChatOpenAI::with_tools` so the model knows the argument schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Name the model uses in its tool calls.
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// JSON Schema of the arguments object.
    pub input_schema: Value,
}

/// Result of a single tool call.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; `ToolNode` turns it
/// into a tool message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    /// Result text sent back to the model.
    pub text: String,
}

/// Errors from listing or calling tools.
///
/// **Interaction**: `ToolNode` reports these to the model as error tool messages;
/// they never abort a run.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("auth failed: {0}")]
    Auth(String),
    #[error("tool api error: {0}")]
    Api(String),
}

/// Tool source: list tools and call a tool.
///
/// **Interaction**: `list_tools` feeds `ChatOpenAI::with_tools`; `call_tool` is
/// used by `ToolNode` for each pending tool call.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Calls a tool by name with a JSON arguments object.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError>;
}
