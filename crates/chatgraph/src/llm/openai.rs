//! OpenAI-compatible chat client (Chat Completions API) implementing `LlmClient`.
//!
//! Sends the whole log, including assistant tool calls and tool results, in the
//! OpenAI wire format. When tools are bound with `with_tools`, the response may
//! carry `tool_calls`.
//!
//! **Interaction**: Implements `LlmClient`; used by `ChatbotNode`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmError, LlmResponse};
use crate::message::{Message, Role, ToolCall};
use crate::tool_source::ToolSpec;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Usually from `OPENAI_API_KEY`.
    pub api_key: String,
    /// Default `https://api.openai.com/v1`; no trailing slash.
    pub base_url: String,
    pub model: String,
    /// Sent only when set.
    pub temperature: Option<f32>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Serialize)]
struct WireFunctionCall<'a> {
    name: &'a str,
    arguments: &'a str,
}

#[derive(Debug, Serialize)]
struct WireToolCall<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionCall<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    /// `null` for an assistant message that only carries tool calls.
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireFunction<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponseFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: ResponseFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

fn to_wire(m: &Message) -> WireMessage<'_> {
    let tool_calls: Vec<WireToolCall<'_>> = m
        .tool_calls
        .iter()
        .map(|tc| WireToolCall {
            id: &tc.id,
            kind: "function",
            function: WireFunctionCall {
                name: &tc.name,
                arguments: &tc.arguments,
            },
        })
        .collect();
    let content = if m.role == Role::Assistant && m.content.is_empty() && !tool_calls.is_empty() {
        None
    } else {
        Some(m.content.as_str())
    };
    WireMessage {
        role: m.role.as_str(),
        content,
        tool_calls,
        tool_call_id: m.tool_call_id.as_deref(),
    }
}

/// OpenAI Chat Completions client.
///
/// **Interaction**: Implements `LlmClient`; used by `ChatbotNode`. Tool specs
/// usually come from `ToolSource::list_tools`.
#[derive(Debug)]
pub struct ChatOpenAI {
    config: OpenAiConfig,
    tools: Vec<ToolSpec>,
    client: reqwest::Client,
}

impl ChatOpenAI {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            tools: Vec::new(),
            client: reqwest::Client::new(),
        }
    }

    /// Binds tools so the model may answer with tool calls.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn build_body<'a>(&'a self, messages: &'a [Message]) -> RequestBody<'a> {
        RequestBody {
            model: &self.config.model,
            messages: messages.iter().map(to_wire).collect(),
            tools: self
                .tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: &t.name,
                        description: t.description.as_deref(),
                        parameters: &t.input_schema,
                    },
                })
                .collect(),
            temperature: self.config.temperature,
        }
    }

    async fn complete(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(messages);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), model = %self.config.model, "chat completion failed");
            return Err(LlmError::from_status(status.as_u16(), text));
        }
        let parsed: ResponseBody =
            serde_json::from_str(&text).map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
        if let Some(usage) = &parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;
        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall::new(tc.id, tc.function.name, tc.function.arguments))
            .collect();
        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        Ok(self.complete(messages).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_uses_openai_tool_call_format() {
        let llm = ChatOpenAI::new(OpenAiConfig::new("k")).with_tools(vec![ToolSpec {
            name: "tavily_search".into(),
            description: Some("search".into()),
            input_schema: json!({"type": "object"}),
        }]);
        let log = vec![
            Message::user("weather?"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall::new("c1", "tavily_search", r#"{"query":"weather"}"#)],
            ),
            Message::tool("c1", "tavily_search", "sunny"),
        ];
        let body = serde_json::to_value(llm.build_body(&log)).unwrap();
        assert_eq!(body["model"], "gpt-4.1");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "tavily_search");
        let assistant = &body["messages"][1];
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["id"], "c1");
        assert_eq!(assistant["tool_calls"][0]["function"]["arguments"], r#"{"query":"weather"}"#);
        assert_eq!(body["messages"][2]["role"], "tool");
        assert_eq!(body["messages"][2]["tool_call_id"], "c1");
        assert!(body.get("temperature").is_none());

        let llm = ChatOpenAI::new(OpenAiConfig::new("k").with_temperature(0.5));
        let body = serde_json::to_value(llm.build_body(&log)).unwrap();
        assert_eq!(body["temperature"], 0.5);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let c = OpenAiConfig::new("k").with_base_url("http://localhost:1/v1/");
        assert_eq!(c.base_url, "http://localhost:1/v1");
    }
}
