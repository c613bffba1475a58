//! State graph: named nodes, static and conditional edges, compile, then invoke or stream.
//!
//! Aligns with LangGraph `StateGraph`: `add_node`, `add_edge(START, ..)`,
//! `add_conditional_edges(..)`, `compile()` or `compile_with_checkpointer(..)`.
//! Only what a chat turn needs is here: no channels, no parallel steps, no interrupts.

mod compile_error;
mod compiled;
mod draw;
mod next;
mod node;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, StreamEvent, StreamMode, DEFAULT_RECURSION_LIMIT};
pub use next::Next;
pub use node::Node;
pub use state_graph::{Router, StateGraph};

/// Virtual entry node; the target of `add_edge(START, id)` runs first.
pub const START: &str = "__start__";
/// Virtual exit node; routing here ends the run.
pub const END: &str = "__end__";
