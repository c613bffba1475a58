//! Tavily web search as a `ToolSource` exposing one tool, `tavily_search`.
//!
//! `POST {base}/search` with bearer auth; the result is rendered as JSON
//! `{query, results: [{title, url, content, score}]}` for the model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

pub const TAVILY_TOOL_NAME: &str = "tavily_search";
pub const TAVILY_DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const DEFAULT_MAX_RESULTS: u32 = 2;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    time_range: Option<String>,
    #[serde(default)]
    include_domains: Vec<String>,
    #[serde(default)]
    exclude_domains: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_range: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_domains: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exclude_domains: Option<&'a [String]>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SearchHit {
    title: String,
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

fn non_empty(v: &[String]) -> Option<&[String]> {
    (!v.is_empty()).then_some(v)
}

/// Tavily search client.
///
/// **Interaction**: Implements `ToolSource`; its spec is bound to `ChatOpenAI` and
/// its calls are made by `ToolNode`.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    api_key: String,
    base_url: String,
    max_results: u32,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: TAVILY_DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn spec() -> ToolSpec {
        ToolSpec {
            name: TAVILY_TOOL_NAME.to_string(),
            description: Some(
                "A search engine optimized for comprehensive, accurate, and trusted results. \
                 Useful for when you need to answer questions about current events."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query to look up"},
                    "topic": {
                        "type": "string",
                        "enum": ["general", "news", "finance"],
                        "description": "Category of the search"
                    },
                    "time_range": {
                        "type": "string",
                        "enum": ["day", "week", "month", "year"],
                        "description": "Only return results from this far back"
                    },
                    "include_domains": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Restrict results to these domains"
                    },
                    "exclude_domains": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Leave out results from these domains"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn search(&self, args: &SearchArgs) -> Result<Value, ToolSourceError> {
        let url = format!("{}/search", self.base_url);
        let body = SearchRequest {
            query: &args.query,
            max_results: self.max_results,
            topic: args.topic.as_deref(),
            time_range: args.time_range.as_deref(),
            include_domains: non_empty(&args.include_domains),
            exclude_domains: non_empty(&args.exclude_domains),
        };
        debug!(query = %args.query, max_results = self.max_results, "tavily search");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "tavily search failed");
            return Err(match status.as_u16() {
                401 | 403 => ToolSourceError::Auth(text),
                400..=499 => ToolSourceError::InvalidInput(text),
                _ => ToolSourceError::Api(text),
            });
        }
        let parsed: SearchResponse =
            serde_json::from_str(&text).map_err(|e| ToolSourceError::Api(format!("{e}: {text}")))?;
        Ok(json!({ "query": args.query, "results": parsed.results }))
    }
}

#[async_trait]
impl ToolSource for TavilySearch {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(vec![Self::spec()])
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if name != TAVILY_TOOL_NAME {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let args: SearchArgs = serde_json::from_value(arguments)
            .map_err(|e| ToolSourceError::InvalidInput(e.to_string()))?;
        if args.query.trim().is_empty() {
            return Err(ToolSourceError::InvalidInput("query is empty".to_string()));
        }
        let result = self.search(&args).await?;
        Ok(ToolCallContent {
            text: result.to_string(),
        })
    }
}
