//! Terminal driver: banner, read-eval loop, streamed output, graph rendering.
//!
//! Everything writes to a caller-supplied `Write` and reads from a `BufRead`, so
//! the binaries pass stdin/stdout and tests pass buffers.
//!
//! **Interaction**: Drives a `CompiledStateGraph<ChatState>` built by `graphs`.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chatgraph::{
    AgentError, ChatState, CompiledStateGraph, RunnableConfig, StreamMode, TurnController,
    TurnPhase,
};
use futures::StreamExt;
use tracing::{debug, warn};

/// Inputs that end the loop (compared trimmed, case-insensitive).
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "exit", "q"];

/// Query run once when stdin is closed or unreadable.
pub const FALLBACK_QUERY: &str = "What do you know about LangGraph?";

pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&input.as_str())
}

/// Prints the title, any extra lines, the exit hint and a rule.
pub fn print_banner<W: Write>(out: &mut W, title: &str, extra: &[&str]) -> std::io::Result<()> {
    writeln!(out, "{title}")?;
    for line in extra {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "Type 'quit', 'exit', or 'q' to end the conversation")?;
    writeln!(out, "{}", "-".repeat(50))
}

/// Runs one user turn in `updates` mode, printing `Assistant: <content>` for the
/// last message of every node update. Returns the phase the turn ended in.
///
/// Graph failures come back as `AgentError` inside the `anyhow::Error`.
pub async fn stream_graph_updates<W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    input: &str,
    config: Option<&RunnableConfig>,
    out: &mut W,
) -> Result<TurnPhase> {
    let mut controller = TurnController::new();
    let mut events = graph.stream(ChatState::from_user(input), config, StreamMode::Updates);
    while let Some(event) = events.next().await {
        let event = event?;
        let messages = &event.state().messages;
        controller.observe(messages)?;
        if let Some(last) = messages.last() {
            writeln!(out, "Assistant: {}", last.content)?;
        }
    }
    debug!(
        phase = ?controller.phase(),
        model_calls = controller.model_calls(),
        tool_rounds = controller.tool_rounds(),
        "turn finished"
    );
    Ok(controller.phase())
}

/// Runs one user turn in `values` mode, pretty-printing the last message of every
/// state the graph passes through (the input state included).
pub async fn stream_values<W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    input: &str,
    config: Option<&RunnableConfig>,
    out: &mut W,
) -> Result<()> {
    let mut events = graph.stream(ChatState::from_user(input), config, StreamMode::Values);
    while let Some(event) = events.next().await {
        let event = event?;
        if let Some(last) = event.state().last_message() {
            writeln!(out, "{}", last.pretty_repr())?;
        }
    }
    Ok(())
}

/// Reads lines from `input` until an exit command or the end of input.
///
/// A failed turn prints `Error: ...` and the loop goes on. When `input` is
/// exhausted or unreadable, [`FALLBACK_QUERY`] is run once and the loop stops.
/// Only failures writing to `out` are returned.
pub async fn run_repl<R: BufRead, W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    config: Option<&RunnableConfig>,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    loop {
        write!(out, "User: ")?;
        out.flush()?;

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) => {}
            Ok(_) => {
                if is_exit_command(&line) {
                    writeln!(out, "Goodbye!")?;
                    return Ok(());
                }
                let query = line.trim_end_matches(['\r', '\n']);
                run_turn(graph, query, config, out).await?;
                continue;
            }
            Err(e) => warn!(error = %e, "reading stdin failed"),
        }

        writeln!(out)?;
        writeln!(out, "User: {FALLBACK_QUERY}")?;
        run_turn(graph, FALLBACK_QUERY, config, out).await?;
        return Ok(());
    }
}

async fn run_turn<W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    query: &str,
    config: Option<&RunnableConfig>,
    out: &mut W,
) -> Result<()> {
    match stream_graph_updates(graph, query, config, out).await {
        Ok(_) => Ok(()),
        Err(e) => match e.downcast::<AgentError>() {
            Ok(agent_err) => {
                warn!(error = %agent_err, "turn failed");
                writeln!(out, "Error: {agent_err}")?;
                Ok(())
            }
            Err(other) => Err(other),
        },
    }
}

/// Writes the graph as Mermaid to `<dir>/<program>_graph.mmd`.
///
/// On failure prints the error and the ASCII edge list instead; returns the
/// file path only when it was written.
pub fn render_graph<W: Write>(
    graph: &CompiledStateGraph<ChatState>,
    program: &str,
    dir: &Path,
    out: &mut W,
) -> std::io::Result<Option<PathBuf>> {
    let file_name = format!("{program}_graph.mmd");
    let path = dir.join(&file_name);
    match std::fs::write(&path, graph.draw_mermaid()) {
        Ok(()) => {
            writeln!(out, "Graph saved as '{file_name}'")?;
            Ok(Some(path))
        }
        Err(e) => {
            writeln!(out, "Failed to save graph: {e}")?;
            writeln!(out, "Graph structure (text representation):")?;
            writeln!(out, "{}", graph.draw_ascii())?;
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_commands_ignore_case_and_whitespace() {
        for input in ["quit", "EXIT", " q\n", "Quit\r\n"] {
            assert!(is_exit_command(input), "{input:?}");
        }
        for input in ["", "quitting", "q q", "bye"] {
            assert!(!is_exit_command(input), "{input:?}");
        }
    }

    #[test]
    fn banner_layout() {
        let mut out = Vec::new();
        print_banner(&mut out, "Chatbot with Tool", &["This chatbot can search the web for current information!"])
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Chatbot with Tool");
        assert_eq!(lines[2], "Type 'quit', 'exit', or 'q' to end the conversation");
        assert_eq!(lines[3], "-".repeat(50));
    }
}
