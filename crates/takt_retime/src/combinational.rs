//! Combinational delay analysis.
//!
//! Computes, for every node, the maximum accumulated propagation delay along
//! any path of register-free connections ending at that node. The maximum
//! over all nodes is the clock period: the slowest combinational stretch the
//! circuit contains, and the fastest clock it can run at as-is.
//!
//! The analysis works on *retimed* edge weights, so the retiming search can
//! evaluate a lag assignment without materializing it.

use crate::error::RetimeError;
use crate::graph::{CircuitGraph, Retiming};
use crate::ids::GraphNodeId;
use std::collections::VecDeque;

/// Computes the per-node maximum combinational delay under a retiming.
///
/// Considers only edges whose retimed register count is zero. Each node's
/// delay is its own weight plus the largest delay among its register-free
/// predecessors; a node with none has delay equal to its own weight.
///
/// Fails with [`RetimeError::CombinationalCycle`] if the register-free
/// subgraph contains a cycle. The error names every node that could not be
/// ordered, in ID order: the cycle members and anything downstream of them.
pub fn combinational_delays(
    graph: &CircuitGraph,
    retiming: &Retiming,
) -> Result<Vec<u64>, RetimeError> {
    let n = graph.node_count();

    // Kahn's algorithm over the register-free subgraph.
    let mut indegree = vec![0usize; n];
    for edge in &graph.edges {
        if retiming.retimed_weight(edge) == 0 {
            indegree[edge.to.as_raw() as usize] += 1;
        }
    }

    let mut queue: VecDeque<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut best_pred = vec![0u64; n];
    let mut delays = vec![0u64; n];
    let mut processed = 0usize;

    while let Some(index) = queue.pop_front() {
        processed += 1;
        let delay = graph.nodes[index].weight + best_pred[index];
        delays[index] = delay;

        for &edge_id in graph.outgoing_edges(GraphNodeId::from_raw(index as u32)) {
            let edge = graph.edge(edge_id);
            if retiming.retimed_weight(edge) != 0 {
                continue;
            }
            let to = edge.to.as_raw() as usize;
            best_pred[to] = best_pred[to].max(delay);
            indegree[to] -= 1;
            if indegree[to] == 0 {
                queue.push_back(to);
            }
        }
    }

    if processed < n {
        let nodes = (0..n)
            .filter(|&i| indegree[i] > 0)
            .map(|i| graph.nodes[i].name.clone())
            .collect();
        return Err(RetimeError::CombinationalCycle { nodes });
    }

    Ok(delays)
}

/// Computes the clock period of the graph under a retiming: the maximum
/// combinational delay over all nodes, or 0 for an empty graph.
pub fn clock_period(graph: &CircuitGraph, retiming: &Retiming) -> Result<u64, RetimeError> {
    let delays = combinational_delays(graph, retiming)?;
    Ok(delays.into_iter().max().unwrap_or(0))
}
