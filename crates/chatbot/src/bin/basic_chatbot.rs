//! Basic chatbot: START -> chatbot -> END, one model call per line of input.

use std::sync::Arc;

use anyhow::Result;
use chatbot::{basic_graph, init_logging, print_banner, render_graph, run_repl, Args, Config};
use chatgraph::ChatOpenAI;
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging();

    let cfg = Config::from_env_and_args(args.model.clone(), args.temperature, false)?;
    let llm = Arc::new(ChatOpenAI::new(cfg.openai()));
    let graph = basic_graph(llm)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !args.no_graph {
        render_graph(&graph, "basic_chatbot", &std::env::current_dir()?, &mut out)?;
    }

    print_banner(&mut out, "Basic Chatbot", &[])?;
    run_repl(&graph, None, std::io::stdin().lock(), &mut out).await
}
