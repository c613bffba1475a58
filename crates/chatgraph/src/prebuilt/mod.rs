//! Nodes the chat graphs are built from.
//!
//! - `ChatbotNode` (`"chatbot"`): one model call, appends the assistant message
//! - `ToolNode` (`"tools"`): answers every pending tool call with a tool message

mod chatbot_node;
mod tool_node;

pub use chatbot_node::ChatbotNode;
pub use tool_node::ToolNode;

/// Id of the model-invocation node.
pub const CHATBOT_NODE: &str = "chatbot";
/// Id of the tool-dispatch node.
pub const TOOLS_NODE: &str = "tools";
