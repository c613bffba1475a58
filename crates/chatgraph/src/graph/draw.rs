//! Text renderings of a compiled graph: Mermaid flowchart and a plain edge list.

use std::collections::BTreeSet;

use super::compiled::CompiledStateGraph;
use super::{END, START};

/// One drawn edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DrawEdge {
    from: String,
    to: String,
    conditional: bool,
}

impl<S> CompiledStateGraph<S> {
    fn draw_edges(&self) -> Vec<DrawEdge> {
        let mut out = vec![DrawEdge {
            from: START.to_string(),
            to: self.entry.clone(),
            conditional: false,
        }];
        for id in &self.node_order {
            if let Some(to) = self.edges.get(id) {
                out.push(DrawEdge {
                    from: id.clone(),
                    to: to.clone(),
                    conditional: false,
                });
            } else if let Some(branch) = self.branches.get(id) {
                // Without a path map any node (or END) is reachable.
                let targets: BTreeSet<String> = match &branch.path_map {
                    Some(map) => map.values().cloned().collect(),
                    None => self
                        .node_order
                        .iter()
                        .filter(|n| *n != id)
                        .cloned()
                        .chain(std::iter::once(END.to_string()))
                        .collect(),
                };
                out.extend(targets.into_iter().map(|to| DrawEdge {
                    from: id.clone(),
                    to,
                    conditional: true,
                }));
            } else {
                out.push(DrawEdge {
                    from: id.clone(),
                    to: END.to_string(),
                    conditional: false,
                });
            }
        }
        out
    }

    /// Mermaid flowchart of the graph (`graph TD;`), solid static edges, dotted
    /// conditional edges.
    pub fn draw_mermaid(&self) -> String {
        let edges = self.draw_edges();
        let mut out = String::from("---\nconfig:\n  flowchart:\n    curve: linear\n---\ngraph TD;\n");
        out.push_str(&format!("\t{START}([<p>{START}</p>]):::first\n"));
        for id in &self.node_order {
            out.push_str(&format!("\t{id}({id})\n"));
        }
        if edges.iter().any(|e| e.to == END) {
            out.push_str(&format!("\t{END}([<p>{END}</p>]):::last\n"));
        }
        for e in &edges {
            let arrow = if e.conditional { "-.->" } else { "-->" };
            out.push_str(&format!("\t{} {} {};\n", e.from, arrow, e.to));
        }
        out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
        out.push_str("\tclassDef first fill-opacity:0\n");
        out.push_str("\tclassDef last fill:#bfb6fc\n");
        out
    }

    /// One line per edge, e.g. `chatbot -.-> tools`.
    pub fn draw_ascii(&self) -> String {
        let mut out = String::new();
        for e in self.draw_edges() {
            let arrow = if e.conditional { "-.->" } else { "-->" };
            out.push_str(&format!("{} {} {}\n", e.from, arrow, e.to));
        }
        out
    }
}
