//! Chat turns as a small state graph: state-in, state-out.
//!
//! A chat program is a `StateGraph<ChatState>` with a `chatbot` node (one model
//! call) and, when tools are bound, a `tools` node that answers the model's tool
//! calls. `tools_condition` routes between them; the graph stops when the latest
//! assistant message carries no pending tool calls. Compiling with a
//! [`Checkpointer`] turns `RunnableConfig::thread_id` into conversational memory.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatgraph::{ChatState, ChatbotNode, Message, MockLlm, StateGraph, END, START};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::with_no_tool_calls("Hello!"));
//! let mut graph = StateGraph::<ChatState>::new();
//! graph
//!     .add_node("chatbot", Arc::new(ChatbotNode::new(llm)))
//!     .add_edge(START, "chatbot")
//!     .add_edge("chatbot", END);
//! let compiled = graph.compile()?;
//! let out = compiled.invoke(ChatState::from_user("Hi"), None).await?;
//! assert_eq!(out.messages.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `sqlite` (default): `SqliteSaver`, a checkpointer persisted with rusqlite.

pub mod controller;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod prebuilt;
pub mod state;
pub mod tool_source;

pub use controller::{tools_condition, TurnController, TurnPhase};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, Next, Node, StateGraph, StreamEvent, StreamMode, END,
    START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmError, LlmResponse, MockLlm, OpenAiConfig};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, JsonSerializer, MemorySaver, RunnableConfig, Serializer, SessionStore,
    StateSnapshot,
};
#[cfg(feature = "sqlite")]
pub use memory::SqliteSaver;
pub use message::{
    add_messages, close_pending_tool_calls, pending_tool_calls, validate_log, LogError, Message,
    Role, ToolCall, TOOL_CALL_NOT_RUN,
};
pub use prebuilt::{ChatbotNode, ToolNode, CHATBOT_NODE, TOOLS_NODE};
pub use state::{ChatState, GraphState};
pub use tool_source::{
    MockToolSource, TavilySearch, ToolCallContent, ToolSource, ToolSourceError, ToolSpec,
};
