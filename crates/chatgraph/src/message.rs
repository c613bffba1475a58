//! Chat messages and the append-only message log.
//!
//! Roles follow the chat-completions convention: system (usually first), user,
//! assistant, tool. An assistant message may carry tool calls; each tool message
//! answers exactly one of them through `tool_call_id`.
//!
//! - `add_messages`: the reducer used to merge updates into a log (append only)
//! - `pending_tool_calls`: calls from the latest assistant message still unanswered
//! - `close_pending_tool_calls`: answers those calls with error tool messages
//! - `validate_log`: checks the tool-call linkage of a whole log

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    /// Wire name (`"system"`, `"user"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
///
/// `arguments` is the raw JSON text the model produced; it is parsed only when the
/// call is dispatched, so malformed arguments can be reported back to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id the answering tool message must echo in `tool_call_id`.
    pub id: String,
    /// Tool name as listed by the `ToolSource`.
    pub name: String,
    /// Arguments as a JSON string.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Tool calls requested by an assistant message; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool messages only: the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name on tool messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// True when a tool message reports a failed call.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
            is_error: false,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Assistant message that asks for tool calls (content is often empty).
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// Successful tool result answering `tool_call_id`.
    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    /// Failed tool result; the content explains the failure to the model.
    pub fn tool_error(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            is_error: true,
            ..Self::tool(tool_call_id, name, content)
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Human-readable block with a role banner, in the style of LangChain's `pretty_print`.
    pub fn pretty_repr(&self) -> String {
        let title = match self.role {
            Role::System => "System Message",
            Role::User => "Human Message",
            Role::Assistant => "Ai Message",
            Role::Tool => "Tool Message",
        };
        let pad = 80usize.saturating_sub(title.len() + 2);
        let left = "=".repeat(pad / 2);
        let right = "=".repeat(pad - pad / 2);
        let mut out = format!("{left} {title} {right}\n");
        if let Some(name) = &self.name {
            out.push_str(&format!("Name: {name}\n"));
        }
        if !self.content.is_empty() || self.tool_calls.is_empty() {
            out.push('\n');
            out.push_str(&self.content);
        }
        if !self.tool_calls.is_empty() {
            out.push_str("\nTool Calls:");
            for tc in &self.tool_calls {
                out.push_str(&format!(
                    "\n  {} ({})\n Call ID: {}\n  Args:",
                    tc.name, tc.id, tc.id
                ));
                match serde_json::from_str::<Value>(&tc.arguments) {
                    Ok(Value::Object(args)) => {
                        for (key, value) in args {
                            let value = match value {
                                Value::String(s) => s,
                                other => other.to_string(),
                            };
                            out.push_str(&format!("\n    {key}: {value}"));
                        }
                    }
                    _ => out.push_str(&format!(" {}", tc.arguments)),
                }
            }
        }
        out
    }
}

/// Reducer for the `messages` channel: appends `right` to `left`, keeping order.
///
/// The log is append-only; nothing already in `left` is replaced or removed.
pub fn add_messages(mut left: Vec<Message>, right: Vec<Message>) -> Vec<Message> {
    left.extend(right);
    left
}

/// Tool calls of the latest assistant message that have no tool message yet.
///
/// Only tool messages may follow that assistant message; if anything else does,
/// the calls are considered abandoned and nothing is pending.
pub fn pending_tool_calls(messages: &[Message]) -> Vec<&ToolCall> {
    let Some(idx) = messages.iter().rposition(|m| m.role == Role::Assistant) else {
        return Vec::new();
    };
    let tail = &messages[idx + 1..];
    if tail.iter().any(|m| m.role != Role::Tool) {
        return Vec::new();
    }
    let answered: HashSet<&str> = tail
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    messages[idx]
        .tool_calls
        .iter()
        .filter(|tc| !answered.contains(tc.id.as_str()))
        .collect()
}

/// Content of the tool message that closes a call which never ran.
pub const TOOL_CALL_NOT_RUN: &str =
    "Error: tool call was not run because the previous turn stopped early.";

/// Answers every pending tool call with an error tool message.
///
/// A run that stops after the model asked for tools (recursion limit, failed
/// node) leaves those calls open in the saved log; the chat-completions API
/// rejects a log where anything but tool messages follows them.
pub fn close_pending_tool_calls(mut messages: Vec<Message>) -> Vec<Message> {
    let closing: Vec<Message> = pending_tool_calls(&messages)
        .into_iter()
        .map(|tc| Message::tool_error(&tc.id, &tc.name, TOOL_CALL_NOT_RUN))
        .collect();
    messages.extend(closing);
    messages
}

/// Violation of the tool-call linkage invariant, with the offending index.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LogError {
    #[error("tool message at {index} has no tool_call_id")]
    MissingToolCallId { index: usize },
    #[error("tool message at {index} does not follow an assistant message with tool calls")]
    OrphanToolMessage { index: usize },
    #[error("tool message at {index} answers unknown tool call {id}")]
    UnknownToolCallId { index: usize, id: String },
    #[error("tool message at {index} answers tool call {id} a second time")]
    DuplicateToolResponse { index: usize, id: String },
    #[error("assistant message at {index} has tool call {id} with no answer before the next turn")]
    UnansweredToolCall { index: usize, id: String },
}

/// Checks that every tool message answers exactly one call from the immediately
/// preceding assistant message (tool messages between them are allowed), and
/// that every call is answered before another message follows. Calls at the
/// very end of the log are still pending and allowed.
pub fn validate_log(messages: &[Message]) -> Result<(), LogError> {
    let mut owner: Option<(usize, &Message)> = None;
    let mut answered: HashSet<&str> = HashSet::new();
    for (index, m) in messages.iter().enumerate() {
        match m.role {
            Role::Tool => {
                let id = m
                    .tool_call_id
                    .as_deref()
                    .ok_or(LogError::MissingToolCallId { index })?;
                let (_, assistant) = owner
                    .filter(|(_, a)| a.has_tool_calls())
                    .ok_or(LogError::OrphanToolMessage { index })?;
                if !assistant.tool_calls.iter().any(|tc| tc.id == id) {
                    return Err(LogError::UnknownToolCallId {
                        index,
                        id: id.to_string(),
                    });
                }
                if !answered.insert(id) {
                    return Err(LogError::DuplicateToolResponse {
                        index,
                        id: id.to_string(),
                    });
                }
            }
            Role::Assistant | Role::System | Role::User => {
                if let Some((at, assistant)) = owner {
                    if let Some(tc) = assistant
                        .tool_calls
                        .iter()
                        .find(|tc| !answered.contains(tc.id.as_str()))
                    {
                        return Err(LogError::UnansweredToolCall {
                            index: at,
                            id: tc.id.clone(),
                        });
                    }
                }
                owner = (m.role == Role::Assistant).then_some((index, m));
                answered.clear();
            }
        }
    }
    Ok(())
}
