//! State graph builder: nodes, static edges, conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` and
//! `add_conditional_edges`, then `compile` or `compile_with_checkpointer` to get
//! a `CompiledStateGraph`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::node::Node;
use crate::graph::{END, START};
use crate::memory::Checkpointer;

/// Routing function for a conditional edge: returns a path-map key, or a node id
/// (or `END`) when the edge has no path map.
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

pub(super) struct Branch<S> {
    pub(super) router: Router<S>,
    /// Route key -> target node id (or `END`). `None` means the router returns targets directly.
    pub(super) path_map: Option<HashMap<String, String>>,
}

/// State graph: named nodes plus edges.
///
/// Generic over state type `S`. Each node has at most one way out: a static edge,
/// a conditional edge, or nothing (END).
///
/// **Interaction**: Accepts `Arc<dyn Node<S>>`; produces `CompiledStateGraph<S>`.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Insertion order, for rendering.
    node_order: Vec<String>,
    duplicates: Vec<String>,
    edges: Vec<(String, String)>,
    branches: Vec<(String, Branch<S>)>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            node_order: Vec::new(),
            duplicates: Vec::new(),
            edges: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Adds a node under `id`. Ids must be unique; a duplicate is reported by `compile`.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), node).is_some() {
            self.duplicates.push(id);
        } else {
            self.node_order.push(id);
        }
        self
    }

    /// Adds a static edge. `from` may be `START`; `to` may be `END`.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Adds a conditional edge out of `source`.
    ///
    /// After `source` runs, `router(&state)` picks a key; `path_map` maps keys to
    /// node ids or `END`. An empty `path_map` means the router returns targets directly.
    pub fn add_conditional_edges<F, I, K, V>(
        &mut self,
        source: impl Into<String>,
        router: F,
        path_map: I,
    ) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = path_map
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.branches.push((
            source.into(),
            Branch {
                router: Arc::new(router),
                path_map: (!map.is_empty()).then_some(map),
            },
        ));
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_with_checkpointer_opt(None)
    }

    /// Builds the executable graph with a checkpointer.
    ///
    /// Aligns with LangGraph `graph.compile(checkpointer=...)`: every run then needs
    /// `RunnableConfig::thread_id`, starts from that thread's latest checkpoint, and
    /// saves a checkpoint after the input and after each node.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_with_checkpointer_opt(Some(checkpointer))
    }

    fn compile_with_checkpointer_opt(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        if let Some(id) = self.duplicates.first() {
            return Err(CompilationError::DuplicateNode(id.clone()));
        }
        if let Some(id) = self.node_order.iter().find(|id| *id == START || *id == END) {
            return Err(CompilationError::ReservedName(id.clone()));
        }

        let mut entry = None;
        let mut edges: HashMap<String, String> = HashMap::new();
        for (from, to) in self.edges {
            if from != START && !self.nodes.contains_key(&from) {
                return Err(CompilationError::NodeNotFound(from));
            }
            check_target(&self.nodes, &to)?;
            if from == START {
                if entry.is_some() {
                    return Err(CompilationError::ConflictingEdges(from));
                }
                if to == END {
                    return Err(CompilationError::MissingEntry);
                }
                entry = Some(to);
            } else {
                if edges.contains_key(&from) {
                    return Err(CompilationError::ConflictingEdges(from));
                }
                edges.insert(from, to);
            }
        }
        let entry = entry.ok_or(CompilationError::MissingEntry)?;

        let mut branches: HashMap<String, Branch<S>> = HashMap::new();
        for (source, branch) in self.branches {
            if !self.nodes.contains_key(&source) {
                return Err(CompilationError::NodeNotFound(source));
            }
            if edges.contains_key(&source) || branches.contains_key(&source) {
                return Err(CompilationError::ConflictingEdges(source));
            }
            if let Some(map) = &branch.path_map {
                for to in map.values() {
                    check_target(&self.nodes, to)?;
                }
            }
            branches.insert(source, branch);
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            node_order: self.node_order,
            entry,
            edges,
            branches,
            checkpointer,
        })
    }
}

fn check_target<N>(nodes: &HashMap<String, N>, to: &str) -> Result<(), CompilationError> {
    if to == END || nodes.contains_key(to) {
        Ok(())
    } else {
        Err(CompilationError::NodeNotFound(to.to_string()))
    }
}
