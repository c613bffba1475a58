//! Command-line chatbots on top of `chatgraph`.
//!
//! - `config`: API keys and endpoints from `.env` / environment
//! - `cli`: flags shared by the binaries
//! - `logging`: stderr tracing subscriber
//! - `graphs`: the basic and the tool-calling graph
//! - `repl`: the terminal loop, streamed output and graph rendering
//!
//! The binaries in `src/bin/` are thin: parse args, load config, build a graph,
//! hand it to `repl`.

pub mod cli;
pub mod config;
pub mod graphs;
pub mod logging;
pub mod repl;

pub use cli::Args;
pub use config::Config;
pub use graphs::{basic_graph, bind_tools, tool_graph};
pub use logging::init_logging;
pub use repl::{
    is_exit_command, print_banner, render_graph, run_repl, stream_graph_updates, stream_values,
    EXIT_COMMANDS, FALLBACK_QUERY,
};
