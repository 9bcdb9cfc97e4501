//! Candidate clock period enumeration.
//!
//! For every ordered node pair `(s, t)` connected by some path, the optimal
//! retiming theory needs the maximum combinational delay achievable along a
//! *minimum-register* path from `s` to `t`, endpoints included. The set of
//! those values over all pairs contains every clock period any legal
//! retiming could produce; the retiming search never has to consider any
//! other value.
//!
//! Path costs are compared by register count ascending, then accumulated
//! delay descending. Distances are computed per source with bounded
//! relaxation passes over the edge list: a node's best cost can still
//! improve through a register-free edge after all its register-bearing
//! routes are known, so no settled-set shortcut applies. Every cycle carries
//! at least one register (the combinational-cycle check runs first), so
//! optimal paths are simple and `|V| - 1` passes suffice.

use crate::graph::CircuitGraph;
use std::collections::BTreeSet;

/// Cost of a path: total registers crossed and total delay of the source
/// nodes along it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct PathCost {
    registers: u64,
    delay: u64,
}

impl PathCost {
    /// Lexicographic order: fewer registers first, then more delay.
    fn beats(self, other: PathCost) -> bool {
        self.registers < other.registers
            || (self.registers == other.registers && self.delay > other.delay)
    }
}

/// Enumerates every clock period a legal retiming of this graph could
/// achieve, sorted ascending and deduplicated.
pub fn candidate_periods(graph: &CircuitGraph) -> Vec<u64> {
    let n = graph.node_count();
    let mut periods = BTreeSet::new();

    for source in 0..n {
        let dist = max_delay_distances(graph, source);
        for (target, cost) in dist.iter().enumerate() {
            if let Some(cost) = cost {
                periods.insert(cost.delay + graph.nodes[target].weight);
            }
        }
    }

    periods.into_iter().collect()
}

/// Computes, for one source, the best [`PathCost`] to every reachable node.
///
/// The source starts at `(0, 0)`; relaxing an edge `u -> x` adds the edge's
/// register weight and `u`'s delay. The target's own weight is added by the
/// caller, so a node's candidate against itself is exactly its own weight.
fn max_delay_distances(graph: &CircuitGraph, source: usize) -> Vec<Option<PathCost>> {
    let n = graph.node_count();
    let mut dist: Vec<Option<PathCost>> = vec![None; n];
    dist[source] = Some(PathCost {
        registers: 0,
        delay: 0,
    });

    // Relaxation passes (optimal paths are simple, so |V| - 1 suffice).
    for _ in 1..n {
        let mut changed = false;
        for edge in &graph.edges {
            let from = edge.from.as_raw() as usize;
            let Some(from_cost) = dist[from] else {
                continue;
            };
            let next = PathCost {
                registers: from_cost.registers + u64::from(edge.weight),
                delay: from_cost.delay + graph.nodes[from].weight,
            };
            let to = edge.to.as_raw() as usize;
            if dist[to].is_none_or(|current| next.beats(current)) {
                dist[to] = Some(next);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::GraphNodeId;
    use takt_netlist::NodeId;

    fn add_node(g: &mut CircuitGraph, name: &str, weight: u64) -> GraphNodeId {
        let raw = g.node_count() as u32;
        g.add_node(name.to_string(), NodeId::from_raw(raw), weight)
    }

    /// All sums of contiguous runs of `weights`, sorted and deduplicated.
    fn sublist_sums(weights: &[u64]) -> Vec<u64> {
        let mut sums = BTreeSet::new();
        for start in 0..weights.len() {
            let mut total = 0;
            for &w in &weights[start..] {
                total += w;
                sums.insert(total);
            }
        }
        sums.into_iter().collect()
    }

    fn chain(weights: &[u64]) -> CircuitGraph {
        let mut g = CircuitGraph::new();
        let nodes: Vec<GraphNodeId> = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| add_node(&mut g, &format!("n{i}"), w))
            .collect();
        for pair in nodes.windows(2) {
            g.add_edge(pair[0], pair[1], 0, Vec::new()).unwrap();
        }
        g
    }

    #[test]
    fn empty_graph_has_no_candidates() {
        assert!(candidate_periods(&CircuitGraph::new()).is_empty());
    }

    #[test]
    fn single_node_is_its_own_candidate() {
        let mut g = CircuitGraph::new();
        add_node(&mut g, "only", 5);
        assert_eq!(candidate_periods(&g), vec![5]);
    }

    #[test]
    fn register_free_chain_yields_contiguous_sums() {
        let weights = [1, 2, 4, 8];
        let g = chain(&weights);
        assert_eq!(candidate_periods(&g), sublist_sums(&weights));
    }

    #[test]
    fn register_splits_the_sums() {
        // a -[1]-> b -> c. Paths crossing the register still count, at
        // register cost 1.
        let mut g = CircuitGraph::new();
        let a = add_node(&mut g, "a", 1);
        let b = add_node(&mut g, "b", 2);
        let c = add_node(&mut g, "c", 4);
        g.add_edge(a, b, 1, Vec::new()).unwrap();
        g.add_edge(b, c, 0, Vec::new()).unwrap();
        assert_eq!(candidate_periods(&g), vec![1, 2, 3, 4, 6, 7]);
    }

    #[test]
    fn fewer_registers_beat_larger_delay() {
        // Two routes s -> t: a direct registered edge and a register-free
        // detour through m. The register-free route wins the pair.
        let mut g = CircuitGraph::new();
        let s = add_node(&mut g, "s", 5);
        let m = add_node(&mut g, "m", 9);
        let t = add_node(&mut g, "t", 1);
        g.add_edge(s, t, 1, Vec::new()).unwrap();
        g.add_edge(s, m, 0, Vec::new()).unwrap();
        g.add_edge(m, t, 0, Vec::new()).unwrap();
        // s->t contributes 5 + 9 + 1, not the registered route's 5 + 1.
        assert_eq!(candidate_periods(&g), vec![1, 5, 9, 10, 14, 15]);
    }

    #[test]
    fn equal_registers_prefer_larger_delay() {
        // Direct register-free edge s -> t and a register-free detour
        // through m: the slower detour defines the candidate.
        let mut g = CircuitGraph::new();
        let s = add_node(&mut g, "s", 5);
        let m = add_node(&mut g, "m", 9);
        let t = add_node(&mut g, "t", 1);
        g.add_edge(s, t, 0, Vec::new()).unwrap();
        g.add_edge(s, m, 0, Vec::new()).unwrap();
        g.add_edge(m, t, 0, Vec::new()).unwrap();
        let candidates = candidate_periods(&g);
        assert!(candidates.contains(&15));
        assert!(!candidates.contains(&6));
    }

    #[test]
    fn heavier_branch_dominates_a_diamond() {
        // a -> b -> {c1, c2} -> d -> e with c1 much heavier than c2. Sums
        // passing through c2 lose to the parallel c1 route at equal
        // register count; sums starting or ending at c2 itself survive.
        let mut g = CircuitGraph::new();
        let a = add_node(&mut g, "a", 1);
        let b = add_node(&mut g, "b", 2);
        let c1 = add_node(&mut g, "c1", 8);
        let c2 = add_node(&mut g, "c2", 4);
        let d = add_node(&mut g, "d", 16);
        let e = add_node(&mut g, "e", 32);
        g.add_edge(a, b, 0, Vec::new()).unwrap();
        g.add_edge(b, c1, 0, Vec::new()).unwrap();
        g.add_edge(b, c2, 0, Vec::new()).unwrap();
        g.add_edge(c1, d, 0, Vec::new()).unwrap();
        g.add_edge(c2, d, 0, Vec::new()).unwrap();
        g.add_edge(d, e, 0, Vec::new()).unwrap();

        let candidates = candidate_periods(&g);
        assert_eq!(
            candidates,
            vec![1, 2, 3, 4, 6, 7, 8, 10, 11, 16, 20, 24, 26, 27, 32, 48, 52, 56, 58, 59]
        );
        // The light branch's through-sums are shadowed by the heavy branch.
        for shadowed in [22, 23, 54, 55] {
            assert!(!candidates.contains(&shadowed));
        }
    }

    #[test]
    fn register_on_the_heavy_branch_flips_dominance() {
        let mut g = CircuitGraph::new();
        let a = add_node(&mut g, "a", 1);
        let b = add_node(&mut g, "b", 2);
        let c1 = add_node(&mut g, "c1", 8);
        let c2 = add_node(&mut g, "c2", 4);
        let d = add_node(&mut g, "d", 16);
        let e = add_node(&mut g, "e", 32);
        g.add_edge(a, b, 0, Vec::new()).unwrap();
        g.add_edge(b, c1, 1, Vec::new()).unwrap();
        g.add_edge(b, c2, 0, Vec::new()).unwrap();
        g.add_edge(c1, d, 0, Vec::new()).unwrap();
        g.add_edge(c2, d, 0, Vec::new()).unwrap();
        g.add_edge(d, e, 0, Vec::new()).unwrap();

        let candidates = candidate_periods(&g);
        // Register-free routes now run through c2, so its through-sums
        // appear and the heavy branch's vanish.
        assert_eq!(
            candidates,
            vec![1, 2, 3, 4, 6, 7, 8, 10, 11, 16, 20, 22, 23, 24, 32, 48, 52, 54, 55, 56]
        );
        for shadowed in [26, 27, 58, 59] {
            assert!(!candidates.contains(&shadowed));
        }
    }

    #[test]
    fn cycle_paths_wrap_through_registers() {
        let mut g = CircuitGraph::new();
        let a = add_node(&mut g, "a", 1);
        let b = add_node(&mut g, "b", 2);
        let c = add_node(&mut g, "c", 4);
        g.add_edge(a, b, 0, Vec::new()).unwrap();
        g.add_edge(b, c, 0, Vec::new()).unwrap();
        g.add_edge(c, a, 1, Vec::new()).unwrap();
        // Wrapping paths like c -> a (one register, delay 4 + 1 = 5) count.
        assert_eq!(candidate_periods(&g), vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
