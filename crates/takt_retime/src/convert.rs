//! Lowering a netlist module into the weighted circuit graph.
//!
//! Register nodes disappear during lowering: every connection path crossing
//! `k` registers becomes a single edge of weight `k` between its
//! combinational endpoints, and the concrete wire links travel on the edge
//! as payload so the applicator can rebuild them later. Parallel
//! connections sharing source node, sink node, and register count collapse
//! onto one edge.

use crate::error::RetimeError;
use crate::graph::CircuitGraph;
use crate::ids::GraphNodeId;
use std::collections::{BTreeMap, HashMap};
use takt_common::{InternalError, Interner};
use takt_delay::PropagationDelay;
use takt_netlist::{Connection, InputWire, Module, NodeId, OutputWire};

/// Builds the weighted circuit graph for one module.
///
/// Every non-register node becomes a graph node weighted by the delay
/// model, boundary ports included. Every input wire of a non-register node
/// must have a driver; the driver is traced backwards through register
/// chains and the number of registers crossed becomes the edge weight.
///
/// A module whose wiring shorts a node's output back to its own input with
/// no register in between fails with
/// [`RetimeError::CombinationalCycle`]. Missing drivers and register-only
/// loops indicate a netlist the elaborator should never have produced and
/// fail as internal errors.
pub fn graph_from_module(
    module: &Module,
    delay: &dyn PropagationDelay,
    interner: &Interner,
) -> Result<CircuitGraph, RetimeError> {
    let mut graph = CircuitGraph::new();
    let mut ids: HashMap<NodeId, GraphNodeId> = HashMap::new();

    for node in module.nodes() {
        if node.is_register() {
            continue;
        }
        let id = graph.add_node(
            interner.resolve(node.name).to_string(),
            node.id,
            delay.for_node(node),
        );
        ids.insert(node.id, id);
    }

    // Group traced connections by (source, sink, register count) before
    // creating edges, so parallel wires of a bus share one edge.
    let mut grouped: BTreeMap<(u32, u32, u32), Vec<Connection>> = BTreeMap::new();
    let register_bound = module.register_count();

    for node in module.nodes() {
        if node.is_register() {
            continue;
        }
        for sink in node.input_wires() {
            let (source, weight) = trace_driver(module, sink, register_bound)?;
            let from = ids[&source.node];
            let to = ids[&node.id];
            grouped
                .entry((from.as_raw(), to.as_raw(), weight))
                .or_default()
                .push(Connection { source, sink });
        }
    }

    for ((from, to, weight), payload) in grouped {
        graph.add_edge(
            GraphNodeId::from_raw(from),
            GraphNodeId::from_raw(to),
            weight,
            payload,
        )?;
    }

    Ok(graph)
}

/// Walks backwards from `sink` through register nodes until a combinational
/// driver is reached, counting the registers crossed. A register carries
/// bit `i` of its single input port to bit `i` of its single output port,
/// so the walk stays on the same bit lane.
fn trace_driver(
    module: &Module,
    sink: InputWire,
    register_bound: usize,
) -> Result<(OutputWire, u32), RetimeError> {
    let mut wire = sink;
    let mut weight: u32 = 0;
    loop {
        let source = module
            .driver_of(wire)
            .ok_or_else(|| InternalError::new(format!("input wire {wire} has no driver")))?;
        if !module.node(source.node).is_register() {
            return Ok((source, weight));
        }
        weight += 1;
        if weight as usize > register_bound {
            return Err(InternalError::new(format!(
                "register-only loop reached while tracing the driver of {sink}"
            ))
            .into());
        }
        wire = InputWire {
            node: source.node,
            port: 0,
            bit: source.bit,
        };
    }
}
