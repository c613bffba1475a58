//! Next-step result from a graph node: follow the edges, jump to a node, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (static or conditional); no edge means END.
/// - **Node(id)**: run the given node next, ignoring edges.
/// - **End**: stop and return the current state.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    Continue,
    Node(String),
    End,
}
