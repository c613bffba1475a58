//! ChatOpenAI and TavilySearch against local axum stub servers.

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chatgraph::{
    AgentError, ChatOpenAI, LlmClient, LlmError, Message, OpenAiConfig, TavilySearch, ToolCall,
    ToolSource, ToolSourceError,
};
use serde_json::{json, Value};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn authorized(headers: &HeaderMap, key: &str) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {key}"))
        .unwrap_or(false)
}

/// Asks for a search when tools are bound and the last message is from the user;
/// otherwise describes what it received.
async fn chat_completions(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers, "test-key") {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    if body["model"] == "overloaded" {
        return (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
    }
    if body["model"] == "broken" {
        return (StatusCode::OK, "not json").into_response();
    }
    let messages = body["messages"].as_array().cloned().unwrap_or_default();
    let last_role = messages
        .last()
        .and_then(|m| m["role"].as_str())
        .unwrap_or_default()
        .to_string();
    let has_tools = body.get("tools").is_some();
    let message = if has_tools && last_role == "user" {
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_abc",
                "type": "function",
                "function": {"name": "tavily_search", "arguments": "{\"query\":\"rust\"}"}
            }]
        })
    } else {
        json!({
            "role": "assistant",
            "content": format!("{} messages, last {}", messages.len(), last_role)
        })
    };
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

async fn openai_stub() -> String {
    serve(Router::new().route("/v1/chat/completions", post(chat_completions))).await
}

fn client(base: &str, key: &str, model: &str) -> ChatOpenAI {
    ChatOpenAI::new(
        OpenAiConfig::new(key)
            .with_base_url(format!("{base}/v1"))
            .with_model(model),
    )
}

#[tokio::test]
async fn chat_openai_returns_content() {
    let base = openai_stub().await;
    let llm = client(&base, "test-key", "gpt-4.1");
    let res = llm.invoke(&[Message::user("Hi")]).await.unwrap();
    assert_eq!(res.content, "1 messages, last user");
    assert!(res.tool_calls.is_empty());
}

#[tokio::test]
async fn chat_openai_parses_tool_calls_and_sends_tool_results() {
    let base = openai_stub().await;
    let llm = client(&base, "test-key", "gpt-4.1").with_tools(vec![TavilySearch::spec()]);
    let res = llm.invoke(&[Message::user("news about rust?")]).await.unwrap();
    assert_eq!(
        res.tool_calls,
        vec![ToolCall::new("call_abc", "tavily_search", r#"{"query":"rust"}"#)]
    );

    let log = vec![
        Message::user("news about rust?"),
        res.into_message(),
        Message::tool("call_abc", "tavily_search", "{}"),
    ];
    let res = llm.invoke(&log).await.unwrap();
    assert_eq!(res.content, "3 messages, last tool");
}

#[tokio::test]
async fn chat_openai_maps_http_errors() {
    let base = openai_stub().await;

    let err = client(&base, "wrong", "gpt-4.1")
        .invoke(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Auth(_))));

    let err = client(&base, "test-key", "overloaded")
        .invoke(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::RateLimit(_))));

    let err = client(&base, "test-key", "broken")
        .invoke(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Parsing(_))));
}

#[tokio::test]
async fn chat_openai_network_failure() {
    let err = client("http://127.0.0.1:9", "k", "gpt-4.1")
        .invoke(&[Message::user("Hi")])
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Network(_))));
}

async fn tavily_search(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers, "tvly-test") {
        return (StatusCode::UNAUTHORIZED, "bad key").into_response();
    }
    let max = body["max_results"].as_u64().unwrap_or(5) as usize;
    let results: Vec<Value> = (0..5)
        .take(max)
        .map(|i| {
            json!({
                "title": format!("Result {i}"),
                "url": format!("https://example.com/{i}"),
                "content": format!("snippet {i} for {}", body["query"].as_str().unwrap_or_default()),
                "score": 0.9,
                "raw_content": null
            })
        })
        .collect();
    Json(json!({
        "query": body["query"],
        "results": results,
        "response_time": 0.1,
        "topic_seen": body.get("topic").cloned().unwrap_or(Value::Null)
    }))
    .into_response()
}

async fn tavily_stub() -> String {
    serve(Router::new().route("/search", post(tavily_search))).await
}

#[tokio::test]
async fn tavily_returns_two_results_by_default() {
    let base = tavily_stub().await;
    let search = TavilySearch::new("tvly-test").with_base_url(&base);
    let out = search
        .call_tool("tavily_search", json!({"query": "LangGraph"}))
        .await
        .unwrap();
    let parsed: Value = serde_json::from_str(&out.text).unwrap();
    assert_eq!(parsed["query"], "LangGraph");
    let results = parsed["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Result 0");
    assert_eq!(results[0]["url"], "https://example.com/0");
    assert_eq!(results[0]["content"], "snippet 0 for LangGraph");
    assert!(results[0].get("raw_content").is_none());
}

#[tokio::test]
async fn tavily_honours_max_results_and_reports_auth_errors() {
    let base = tavily_stub().await;
    let search = TavilySearch::new("tvly-test")
        .with_base_url(&base)
        .with_max_results(4);
    let out = search
        .call_tool("tavily_search", json!({"query": "rust", "topic": "news"}))
        .await
        .unwrap();
    let parsed: Value = serde_json::from_str(&out.text).unwrap();
    assert_eq!(parsed["results"].as_array().unwrap().len(), 4);

    let err = TavilySearch::new("wrong")
        .with_base_url(&base)
        .call_tool("tavily_search", json!({"query": "rust"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolSourceError::Auth(_)));
}
