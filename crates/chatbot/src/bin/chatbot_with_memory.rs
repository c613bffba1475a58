//! Chatbot with memory: a scripted conversation over two threads sharing one
//! checkpointer. Thread "1" remembers the user's name; thread "2" does not.
//!
//! Sessions live in memory unless `CHATBOT_SQLITE_PATH` points at a database.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use chatbot::{bind_tools, init_logging, render_graph, stream_values, tool_graph, Args, Config};
use chatgraph::{
    ChatState, Checkpointer, MemorySaver, RunnableConfig, SessionStore, ToolSource,
};
use clap::Parser;

/// `(thread id, user input)` in the order they are sent.
const SCRIPT: [(&str, &str); 3] = [
    ("1", "Hi there! My name is Will."),
    ("1", "Remember my name?"),
    ("2", "Remember my name?"),
];

#[cfg(feature = "sqlite")]
fn checkpointer(cfg: &Config) -> Result<Arc<dyn Checkpointer<ChatState>>> {
    use anyhow::Context;
    use chatgraph::{JsonSerializer, SqliteSaver};

    Ok(match &cfg.sqlite_path {
        Some(path) => Arc::new(
            SqliteSaver::<ChatState>::new(path, Arc::new(JsonSerializer))
                .with_context(|| format!("open session database {}", path.display()))?,
        ),
        None => Arc::new(MemorySaver::<ChatState>::new()),
    })
}

#[cfg(not(feature = "sqlite"))]
fn checkpointer(cfg: &Config) -> Result<Arc<dyn Checkpointer<ChatState>>> {
    if cfg.sqlite_path.is_some() {
        tracing::warn!("CHATBOT_SQLITE_PATH ignored: built without the sqlite feature");
    }
    Ok(Arc::new(MemorySaver::<ChatState>::new()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging();

    let cfg = Config::from_env_and_args(args.model.clone(), args.temperature, true)?;
    let tools: Arc<dyn ToolSource> = match cfg.tavily() {
        Some(search) => Arc::new(search),
        None => anyhow::bail!("TAVILY_API_KEY not set"),
    };
    let llm = Arc::new(bind_tools(cfg.openai(), tools.as_ref()).await?);
    let saver = checkpointer(&cfg)?;
    let graph = tool_graph(llm, tools, Some(saver.clone()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !args.no_graph {
        render_graph(&graph, "chatbot_with_memory", &std::env::current_dir()?, &mut out)?;
    }

    writeln!(out, "Chatbot with Memory")?;
    for (thread, input) in SCRIPT {
        let config = RunnableConfig::thread(thread);
        if let Err(e) = stream_values(&graph, input, Some(&config), &mut out).await {
            writeln!(out, "Error: {e}")?;
        }
    }

    let sessions = SessionStore::new(saver);
    for thread in ["1", "2"] {
        let log = sessions.get(thread).await?;
        writeln!(out, "Session {thread}: {} messages", log.len())?;
    }
    Ok(())
}
