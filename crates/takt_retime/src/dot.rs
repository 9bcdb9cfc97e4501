//! Graphviz rendering of circuit graphs for inspecting retiming runs.

use crate::graph::CircuitGraph;
use crate::graph::Retiming;
use crate::ids::GraphNodeId;

/// Renders `graph` as a Graphviz digraph.
///
/// Each node shows its name and delay weight; each edge is labeled with
/// its register count under `retiming` and drawn thicker the more
/// registers it carries. Pass the identity retiming to render the graph
/// as built. Edges closing a cycle are excluded from ranking so feedback
/// loops do not stretch the layout.
pub fn graph_to_dot(graph: &CircuitGraph, retiming: &Retiming, title: &str) -> String {
    let feedback = feedback_edges(graph);
    let mut out = String::new();
    out.push_str(&format!("digraph \"{}\" {{\n", dot_escape(title)));
    out.push_str("  rankdir=LR;\n");
    out.push_str("  splines=true;\n");
    out.push_str("  node [shape=box, fontname=\"JetBrains Mono,Monospace\"];\n");
    out.push_str("  edge [fontname=\"JetBrains Mono,Monospace\"];\n");

    for (i, node) in graph.nodes.iter().enumerate() {
        let label = dot_escape(&format!("{} [{}]", node.name, node.weight));
        out.push_str(&format!("  n{i} [label=\"{label}\"];\n"));
    }

    for (i, edge) in graph.edges.iter().enumerate() {
        let weight = retiming.retimed_weight(edge);
        let pen = (1 + weight.max(0)).min(6);
        let mut attrs = format!("label=\"{weight}\", penwidth={pen}");
        if feedback[i] {
            attrs.push_str(", constraint=false");
        }
        out.push_str(&format!(
            "  n{} -> n{} [{attrs}];\n",
            edge.from.as_raw(),
            edge.to.as_raw(),
        ));
    }

    out.push_str("}\n");
    out
}

fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Marks every edge that closes a cycle in a depth-first traversal.
fn feedback_edges(graph: &CircuitGraph) -> Vec<bool> {
    const ACTIVE: u8 = 1;
    const DONE: u8 = 2;
    let mut feedback = vec![false; graph.edge_count()];
    let mut state = vec![0u8; graph.node_count()];
    let mut stack: Vec<(u32, usize)> = Vec::new();

    for root in 0..graph.node_count() as u32 {
        if state[root as usize] != 0 {
            continue;
        }
        state[root as usize] = ACTIVE;
        stack.push((root, 0));
        while let Some((node, offset)) = stack.pop() {
            let outgoing = graph.outgoing_edges(GraphNodeId::from_raw(node));
            if offset >= outgoing.len() {
                state[node as usize] = DONE;
                continue;
            }
            stack.push((node, offset + 1));
            let edge_id = outgoing[offset];
            let target = graph.edge(edge_id).to.as_raw();
            match state[target as usize] {
                0 => {
                    state[target as usize] = ACTIVE;
                    stack.push((target, 0));
                }
                ACTIVE => feedback[edge_id.as_raw() as usize] = true,
                _ => {}
            }
        }
    }
    feedback
}
