//! Command-line flags shared by the three chatbot programs.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Chat with an OpenAI-compatible model from the terminal")]
pub struct Args {
    /// OpenAI model name
    #[arg(long, env = "OPENAI_MODEL", default_value = chatgraph::llm::DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature (model default when omitted)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Do not render the graph to `<program>_graph.mmd` at startup
    #[arg(long)]
    pub no_graph: bool,
}
