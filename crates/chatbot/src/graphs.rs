//! The two graph shapes the programs run.
//!
//! **Interaction**: Built by the binaries from `Config`; driven by `repl`.

use std::sync::Arc;

use chatgraph::{
    tools_condition, ChatOpenAI, ChatState, ChatbotNode, Checkpointer, CompilationError,
    CompiledStateGraph, LlmClient, OpenAiConfig, StateGraph, ToolNode, ToolSource,
    ToolSourceError, CHATBOT_NODE, END, START, TOOLS_NODE,
};

/// START -> chatbot -> END.
pub fn basic_graph(
    llm: Arc<dyn LlmClient>,
) -> Result<CompiledStateGraph<ChatState>, CompilationError> {
    let mut graph = StateGraph::<ChatState>::new();
    graph
        .add_node(CHATBOT_NODE, Arc::new(ChatbotNode::new(llm)))
        .add_edge(START, CHATBOT_NODE)
        .add_edge(CHATBOT_NODE, END);
    graph.compile()
}

/// START -> chatbot, chatbot -> tools | END via `tools_condition`, tools -> chatbot.
///
/// With a checkpointer every run needs a thread id and continues that thread.
pub fn tool_graph(
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    checkpointer: Option<Arc<dyn Checkpointer<ChatState>>>,
) -> Result<CompiledStateGraph<ChatState>, CompilationError> {
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
    match checkpointer {
        Some(checkpointer) => graph.compile_with_checkpointer(checkpointer),
        None => graph.compile(),
    }
}

/// A `ChatOpenAI` bound to every tool `tools` lists.
pub async fn bind_tools(
    config: OpenAiConfig,
    tools: &dyn ToolSource,
) -> Result<ChatOpenAI, ToolSourceError> {
    let specs = tools.list_tools().await?;
    Ok(ChatOpenAI::new(config).with_tools(specs))
}
