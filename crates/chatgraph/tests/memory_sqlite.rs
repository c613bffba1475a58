//! Integration tests for SqliteSaver. Run with: cargo test -p chatgraph --features sqlite --test memory_sqlite
#![cfg(feature = "sqlite")]

use std::sync::Arc;

use chatgraph::{
    ChatState, ChatbotNode, Checkpoint, CheckpointSource, Checkpointer, JsonSerializer,
    LlmResponse, Message, MockLlm, RunnableConfig, SessionStore, SqliteSaver, StateGraph,
    CHATBOT_NODE, END, START,
};

fn saver_at(path: &std::path::Path) -> Arc<SqliteSaver<ChatState>> {
    Arc::new(SqliteSaver::<ChatState>::new(path, Arc::new(JsonSerializer)).unwrap())
}

#[tokio::test]
async fn sqlite_saver_put_get_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let saver = saver_at(&dir.path().join("checkpoints.db"));
    let config = RunnableConfig::thread("t1");

    for step in 0..3u64 {
        let mut cp = Checkpoint::from_state(
            ChatState::from_user(format!("m{step}")),
            CheckpointSource::Update,
            step,
        );
        cp.id = format!("c{step}");
        saver.put(&config, &cp).await.unwrap();
    }

    let (latest, meta) = saver.get_tuple(&config).await.unwrap().unwrap();
    assert_eq!(latest.id, "c2");
    assert_eq!(latest.values.messages[0].content, "m2");
    assert_eq!(latest.next, None);
    assert_eq!(meta.step, 2);
    assert_eq!(meta.source, CheckpointSource::Update);

    let (first, _) = saver
        .get_tuple(&config.clone().with_checkpoint_id("c0"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.values.messages[0].content, "m0");

    let ids: Vec<String> = saver
        .list(&config, Some(2), None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.checkpoint_id)
        .collect();
    assert_eq!(ids, ["c2", "c1"]);

    assert!(saver
        .get_tuple(&RunnableConfig::thread("t2"))
        .await
        .unwrap()
        .is_none());
}

/// A conversation saved by one process is resumed by the next.
#[tokio::test]
async fn conversation_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.db");
    let config = RunnableConfig::thread("1");

    let build = |saver: Arc<SqliteSaver<ChatState>>, llm: Arc<MockLlm>| {
        let mut graph = StateGraph::<ChatState>::new();
        graph
            .add_node(CHATBOT_NODE, Arc::new(ChatbotNode::new(llm)))
            .add_edge(START, CHATBOT_NODE)
            .add_edge(CHATBOT_NODE, END);
        graph.compile_with_checkpointer(saver).unwrap()
    };

    let first = build(
        saver_at(&path),
        Arc::new(MockLlm::with_no_tool_calls("Nice to meet you, Will.")),
    );
    first
        .invoke(ChatState::from_user("Hi there! My name is Will."), Some(&config))
        .await
        .unwrap();
    drop(first);

    let llm = Arc::new(MockLlm::from_fn(|log: &[Message]| {
        LlmResponse::text(format!("You said: {}", log[0].content))
    }));
    let second = build(saver_at(&path), llm.clone());
    let out = second
        .invoke(ChatState::from_user("Remember my name?"), Some(&config))
        .await
        .unwrap();
    assert_eq!(out.messages.len(), 4);
    assert_eq!(
        out.messages[3].content,
        "You said: Hi there! My name is Will."
    );
    assert_eq!(llm.seen_messages()[0].len(), 3);

    let sessions = SessionStore::new(saver_at(&path));
    assert_eq!(sessions.get("1").await.unwrap().len(), 4);
}
