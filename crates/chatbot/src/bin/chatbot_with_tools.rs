//! Chatbot with web search: the model may call `tavily_search` before answering.

use std::sync::Arc;

use anyhow::Result;
use chatbot::{bind_tools, init_logging, print_banner, render_graph, run_repl, tool_graph, Args, Config};
use chatgraph::ToolSource;
use clap::Parser;

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
    let graph = tool_graph(llm, tools, None)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !args.no_graph {
        render_graph(&graph, "chatbot_with_tools", &std::env::current_dir()?, &mut out)?;
    }

    print_banner(
        &mut out,
        "Chatbot with Tool",
        &["This chatbot can search the web for current information!"],
    )?;
    run_repl(&graph, None, std::io::stdin().lock(), &mut out).await
}
