//! Chat turns through the prebuilt `chatbot` / `tools` graph with mock model and tools.

use std::sync::Arc;

use chatgraph::{
    tools_condition, validate_log, AgentError, ChatState, ChatbotNode, CompiledStateGraph,
    LlmClient, LlmError, LlmResponse, Message, MockLlm, MockToolSource, Role, StateGraph,
    StreamMode, ToolCall, ToolNode, ToolSource, TurnController, TurnPhase, CHATBOT_NODE, END,
    START, TOOLS_NODE,
};
use futures::StreamExt;

fn tool_graph(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>) -> CompiledStateGraph<ChatState> {
    let mut graph = StateGraph::<ChatState>::new();
    graph
        .add_node(CHATBOT_NODE, Arc::new(ChatbotNode::new(llm)))
        .add_node(TOOLS_NODE, Arc::new(ToolNode::new(tools)))
        .add_edge(START, CHATBOT_NODE)
        .add_conditional_edges(
            CHATBOT_NODE,
            tools_condition,
            [(TOOLS_NODE, TOOLS_NODE), (END, END)],
        )
        .add_edge(TOOLS_NODE, CHATBOT_NODE);
    graph.compile().unwrap()
}

#[tokio::test]
async fn basic_turn_appends_one_assistant_message() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("Hello, how can I help?"));
    let mut graph = StateGraph::<ChatState>::new();
    graph
        .add_node(CHATBOT_NODE, Arc::new(ChatbotNode::new(llm.clone())))
        .add_edge(START, CHATBOT_NODE)
        .add_edge(CHATBOT_NODE, END);
    let out = graph
        .compile()
        .unwrap()
        .invoke(ChatState::from_user("Hi"), None)
        .await
        .unwrap();
    assert_eq!(out.messages.len(), 2);
    assert_eq!(out.messages[1].role, Role::Assistant);
    assert_eq!(out.messages[1].content, "Hello, how can I help?");
    assert_eq!(llm.call_count(), 1);
}

/// **Scenario**: tool-requiring question -> pending tool call -> dispatch -> model
/// sees the result -> final answer -> DONE.
#[tokio::test]
async fn tool_turn_dispatches_and_returns_to_model() {
    let llm = Arc::new(MockLlm::first_tools_then_end(
        "weather in SF",
        "It is sunny in SF.",
    ));
    let tools = Arc::new(MockToolSource::search_returning(
        r#"{"query":"weather in SF","results":[]}"#,
    ));
    let graph = tool_graph(llm.clone(), tools.clone());

    let mut controller = TurnController::new();
    let mut nodes = Vec::new();
    let mut last = None;
    let mut events = graph.stream(
        ChatState::from_user("What's the weather in SF?"),
        None,
        StreamMode::Updates,
    );
    while let Some(event) = events.next().await {
        let event = event.unwrap();
        nodes.push(event.node().unwrap_or_default().to_string());
        controller.observe(&event.state().messages).unwrap();
        last = Some(event.into_state());
    }
    drop(events);

    assert_eq!(nodes, [CHATBOT_NODE, TOOLS_NODE, CHATBOT_NODE]);
    assert_eq!(controller.phase(), TurnPhase::Done);
    assert_eq!(controller.model_calls(), 2);
    assert_eq!(controller.tool_rounds(), 1);

    let state = last.unwrap();
    assert_eq!(state.messages.len(), 4);
    validate_log(&state.messages).unwrap();
    let tool_msg = &state.messages[2];
    assert_eq!(tool_msg.role, Role::Tool);
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call-1"));
    assert!(!tool_msg.is_error);
    assert_eq!(state.messages[3].content, "It is sunny in SF.");

    let seen = llm.seen_messages();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].len(), 3);
    assert_eq!(seen[1][2].role, Role::Tool);

    let calls = tools.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "tavily_search");
    assert_eq!(calls[0].1["query"], "weather in SF");
}

#[tokio::test]
async fn multiple_calls_run_in_request_order() {
    let llm = Arc::new(MockLlm::scripted([
        LlmResponse {
            content: String::new(),
            tool_calls: vec![
                ToolCall::new("c1", "tavily_search", r#"{"query":"first"}"#),
                ToolCall::new("c2", "tavily_search", r#"{"query":"second"}"#),
            ],
        },
        LlmResponse::text("done"),
    ]));
    let tools = Arc::new(MockToolSource::search_returning("r"));
    let out = tool_graph(llm, tools.clone())
        .invoke(ChatState::from_user("q"), None)
        .await
        .unwrap();
    let ids: Vec<&str> = out
        .messages
        .iter()
        .filter_map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, ["c1", "c2"]);
    let queries: Vec<String> = tools
        .calls()
        .iter()
        .map(|(_, args)| args["query"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(queries, ["first", "second"]);
    validate_log(&out.messages).unwrap();
}

#[tokio::test]
async fn tool_failures_become_error_messages() {
    let llm = Arc::new(MockLlm::scripted([
        LlmResponse {
            content: String::new(),
            tool_calls: vec![
                ToolCall::new("c1", "no_such_tool", "{}"),
                ToolCall::new("c2", "tavily_search", "{not json"),
                ToolCall::new("c3", "flaky", r#"{"query":"x"}"#),
            ],
        },
        LlmResponse::text("Sorry, the search failed."),
    ]));
    let tools = Arc::new(
        MockToolSource::search_returning("r").with_failing_tool("flaky", "upstream down"),
    );
    let out = tool_graph(llm, tools.clone())
        .invoke(ChatState::from_user("q"), None)
        .await
        .unwrap();

    let tool_msgs: Vec<&Message> = out.messages.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(tool_msgs.len(), 3);
    assert!(tool_msgs.iter().all(|m| m.is_error));
    assert!(tool_msgs[0].content.contains("tool not found: no_such_tool"));
    assert!(tool_msgs[1].content.contains("invalid arguments"));
    assert!(tool_msgs[2].content.contains("upstream down"));
    assert!(tool_msgs[2].content.ends_with("Please fix your mistakes."));
    // malformed arguments never reach the tool source
    assert_eq!(tools.calls().len(), 2);
    assert_eq!(out.messages.last().unwrap().content, "Sorry, the search failed.");
    validate_log(&out.messages).unwrap();
}

#[tokio::test]
async fn model_error_aborts_the_turn() {
    let llm = Arc::new(MockLlm::failing(LlmError::Network("connection refused".into())));
    let tools = Arc::new(MockToolSource::search_returning("r"));
    let err = tool_graph(llm, tools)
        .invoke(ChatState::from_user("q"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::Network(_))));
}

#[tokio::test]
async fn model_that_never_stops_hits_recursion_limit() {
    let llm = Arc::new(MockLlm::from_fn(|log: &[Message]| LlmResponse {
        content: String::new(),
        tool_calls: vec![ToolCall::new(
            format!("c{}", log.len()),
            "tavily_search",
            r#"{"query":"again"}"#,
        )],
    }));
    let tools = Arc::new(MockToolSource::search_returning("r"));
    let err = tool_graph(llm, tools)
        .invoke(ChatState::from_user("loop"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::RecursionLimit(25)));
}

#[tokio::test]
async fn tools_node_without_pending_calls_is_invalid() {
    let node = ToolNode::new(Arc::new(MockToolSource::search_returning("r")));
    let err = chatgraph::Node::run(&node, ChatState::from_user("q"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::InvalidState(_)));
}
