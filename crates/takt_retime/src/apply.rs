//! Materializing a computed retiming back into a concrete netlist.
//!
//! The input module is never mutated. A fresh module is built from scratch:
//! every non-register node is copied over, and registers are synthesized
//! purely from the retimed edge weights. Register nodes present in the
//! input are derived state and are never trusted or carried across.

use crate::error::RetimeError;
use crate::graph::{CircuitGraph, Retiming};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use takt_common::{Ident, InternalError, Interner};
use takt_netlist::{
    Connection, InputWire, Module, NetlistError, NodeId, NodeKind, OutputWire, Port,
};

/// Deterministic name source for synthesized registers.
///
/// One namer is threaded through the applicator per module, so modules
/// retimed in parallel cannot interleave counters or produce
/// run-order-dependent names.
#[derive(Debug, Default)]
pub struct RegisterNamer {
    next: u64,
}

impl RegisterNamer {
    /// Creates a namer starting at `_retime_reg_0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next synthesized name not already taken in `module`.
    fn fresh(&mut self, module: &Module, interner: &Interner) -> Ident {
        loop {
            let candidate = interner.get_or_intern(&format!("_retime_reg_{}", self.next));
            self.next += 1;
            if module.node_by_name(candidate).is_none() {
                return candidate;
            }
        }
    }
}

/// Rebuilds `module` so its register placement matches `retiming`.
///
/// Non-register nodes are copied in arena order. Edges are then grouped by
/// (source, sink) node pair with their payloads merged; each group whose
/// retimed weight is `w > 0` becomes a chain of `w` fresh register nodes as
/// wide as the group's payload, and a group at weight zero reconnects its
/// payload directly. Parallel edges between one pair that disagree on the
/// retimed register count cannot be materialized as a single chain and
/// fail as an internal error, as does an illegal retiming.
pub fn apply_retiming(
    module: &Module,
    graph: &CircuitGraph,
    retiming: &Retiming,
    interner: &Interner,
    namer: &mut RegisterNamer,
) -> Result<Module, RetimeError> {
    if !retiming.is_legal(graph) {
        return Err(InternalError::new(format!(
            "retiming for module '{}' assigns a negative register count",
            interner.resolve(module.name),
        ))
        .into());
    }

    let mut rebuilt = Module::new(module.name);
    let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
    for node in module.nodes() {
        let added = match &node.kind {
            NodeKind::Register => continue,
            NodeKind::Input => rebuilt.add_input(node.name, node.output_ports.clone()),
            NodeKind::Output => rebuilt.add_output(node.name, node.input_ports.clone()),
            NodeKind::Operator { op } => rebuilt.add_operator(
                node.name,
                *op,
                node.input_ports.clone(),
                node.output_ports.clone(),
            ),
            NodeKind::PassThrough => rebuilt.add_pass_through(
                node.name,
                node.input_ports.clone(),
                node.output_ports.clone(),
            ),
            NodeKind::ModuleInstance { module: target } => rebuilt.add_instance(
                node.name,
                *target,
                node.input_ports.clone(),
                node.output_ports.clone(),
            ),
        };
        let id = added.map_err(|err| rebuild_error(module, interner, err))?;
        remap.insert(node.id, id);
    }

    // One register chain per (source, sink) pair. Payloads of parallel
    // same-weight edges merge; diverging weights within a pair would make
    // the chain ambiguous.
    let mut groups: BTreeMap<(u32, u32), (i64, Vec<Connection>)> = BTreeMap::new();
    for edge in &graph.edges {
        let weight = retiming.retimed_weight(edge);
        match groups.entry((edge.from.as_raw(), edge.to.as_raw())) {
            Entry::Vacant(slot) => {
                slot.insert((weight, edge.payload.clone()));
            }
            Entry::Occupied(mut slot) => {
                let (existing, payload) = slot.get_mut();
                if *existing != weight {
                    return Err(InternalError::new(format!(
                        "connections from '{}' to '{}' disagree on register count ({} vs {})",
                        graph.node(edge.from).name,
                        graph.node(edge.to).name,
                        existing,
                        weight,
                    ))
                    .into());
                }
                payload.extend(edge.payload.iter().copied());
            }
        }
    }

    for (weight, payload) in groups.into_values() {
        if payload.is_empty() {
            continue;
        }
        let count = u32::try_from(weight).map_err(|_| {
            InternalError::new(format!("retimed register count {weight} out of range"))
        })?;
        if count == 0 {
            for conn in &payload {
                rebuilt
                    .connect(remap_output(&remap, conn.source), remap_input(&remap, conn.sink))
                    .map_err(|err| rebuild_error(module, interner, err))?;
            }
            continue;
        }

        let width = payload.len() as u32;
        let mut chain = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = namer.fresh(&rebuilt, interner);
            let id = rebuilt
                .add_register(
                    name,
                    Port::new(interner.get_or_intern("d"), width),
                    Port::new(interner.get_or_intern("q"), width),
                )
                .map_err(|err| rebuild_error(module, interner, err))?;
            chain.push(id);
        }

        for (lane, conn) in payload.iter().enumerate() {
            let bit = lane as u32;
            rebuilt
                .connect(
                    remap_output(&remap, conn.source),
                    InputWire {
                        node: chain[0],
                        port: 0,
                        bit,
                    },
                )
                .map_err(|err| rebuild_error(module, interner, err))?;
        }
        for pair in chain.windows(2) {
            for bit in 0..width {
                rebuilt
                    .connect(
                        OutputWire {
                            node: pair[0],
                            port: 0,
                            bit,
                        },
                        InputWire {
                            node: pair[1],
                            port: 0,
                            bit,
                        },
                    )
                    .map_err(|err| rebuild_error(module, interner, err))?;
            }
        }
        let last = chain[chain.len() - 1];
        for (lane, conn) in payload.iter().enumerate() {
            let bit = lane as u32;
            rebuilt
                .connect(
                    OutputWire {
                        node: last,
                        port: 0,
                        bit,
                    },
                    remap_input(&remap, conn.sink),
                )
                .map_err(|err| rebuild_error(module, interner, err))?;
        }
    }

    Ok(rebuilt)
}

fn remap_output(remap: &HashMap<NodeId, NodeId>, wire: OutputWire) -> OutputWire {
    OutputWire {
        node: remap[&wire.node],
        port: wire.port,
        bit: wire.bit,
    }
}

fn remap_input(remap: &HashMap<NodeId, NodeId>, wire: InputWire) -> InputWire {
    InputWire {
        node: remap[&wire.node],
        port: wire.port,
        bit: wire.bit,
    }
}

fn rebuild_error(module: &Module, interner: &Interner, err: NetlistError) -> RetimeError {
    InternalError::new(format!(
        "failed to rebuild module '{}' after retiming: {err}",
        interner.resolve(module.name),
    ))
    .into()
}
