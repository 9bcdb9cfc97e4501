//! Module definitions — one flat netlist per elaborated module.
//!
//! A [`Module`] owns its nodes in an arena and its connections in a
//! single-driver map keyed by input wire. Mutation goes through validating
//! methods; the invariants (unique node names, one driver per input wire,
//! wires that exist) are enforced at the point of construction so the
//! retiming engine can assume them.

use crate::arena::Arena;
use crate::ids::NodeId;
use crate::node::{Node, NodeKind, OperatorKind, Port};
use crate::wire::{Connection, InputWire, OutputWire};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use takt_common::Ident;

/// Errors raised by netlist construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// A node with the given name already exists in the module.
    #[error("a node with interned name {} already exists in the module", .name.as_raw())]
    DuplicateNode {
        /// The clashing name.
        name: Ident,
    },

    /// An input wire reference does not exist in the module.
    #[error("input wire {wire} does not exist")]
    UnknownInputWire {
        /// The invalid wire reference.
        wire: InputWire,
    },

    /// An output wire reference does not exist in the module.
    #[error("output wire {wire} does not exist")]
    UnknownOutputWire {
        /// The invalid wire reference.
        wire: OutputWire,
    },

    /// An input wire already has a driver.
    #[error("input wire {sink} is already driven by {driver}")]
    AlreadyDriven {
        /// The doubly-driven input wire.
        sink: InputWire,
        /// Its existing driver.
        driver: OutputWire,
    },

    /// An input wire has no driver to disconnect.
    #[error("input wire {sink} has no driver")]
    NotConnected {
        /// The undriven input wire.
        sink: InputWire,
    },

    /// A node's port declaration is structurally invalid.
    #[error("invalid node shape: {reason}")]
    InvalidNodeShape {
        /// What is wrong with the declaration.
        reason: String,
    },
}

/// A single elaborated module: a flat netlist of nodes and wire connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: Ident,
    nodes: Arena<NodeId, Node>,
    names: HashMap<Ident, NodeId>,
    drivers: HashMap<InputWire, OutputWire>,
}

impl Module {
    /// Creates a new, empty module.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            nodes: Arena::new(),
            names: HashMap::new(),
            drivers: HashMap::new(),
        }
    }

    fn add_node(
        &mut self,
        name: Ident,
        kind: NodeKind,
        input_ports: Vec<Port>,
        output_ports: Vec<Port>,
    ) -> Result<NodeId, NetlistError> {
        if self.names.contains_key(&name) {
            return Err(NetlistError::DuplicateNode { name });
        }
        if input_ports.iter().chain(&output_ports).any(|p| p.width == 0) {
            return Err(NetlistError::InvalidNodeShape {
                reason: "port width must be at least 1".to_string(),
            });
        }
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.alloc(Node {
            id,
            name,
            kind,
            input_ports,
            output_ports,
        });
        self.names.insert(name, id);
        Ok(id)
    }

    /// Adds a module boundary input node. Its ports are outputs seen from
    /// inside the module.
    pub fn add_input(&mut self, name: Ident, ports: Vec<Port>) -> Result<NodeId, NetlistError> {
        self.add_node(name, NodeKind::Input, Vec::new(), ports)
    }

    /// Adds a module boundary output node. Its ports are inputs seen from
    /// inside the module.
    pub fn add_output(&mut self, name: Ident, ports: Vec<Port>) -> Result<NodeId, NetlistError> {
        self.add_node(name, NodeKind::Output, ports, Vec::new())
    }

    /// Adds an operator invocation node.
    pub fn add_operator(
        &mut self,
        name: Ident,
        op: OperatorKind,
        input_ports: Vec<Port>,
        output_ports: Vec<Port>,
    ) -> Result<NodeId, NetlistError> {
        self.add_node(name, NodeKind::Operator { op }, input_ports, output_ports)
    }

    /// Adds a single-cycle register node. The input and output ports must
    /// have equal width; bit `i` of the input appears on bit `i` of the
    /// output one clock later.
    pub fn add_register(
        &mut self,
        name: Ident,
        input: Port,
        output: Port,
    ) -> Result<NodeId, NetlistError> {
        if input.width != output.width {
            return Err(NetlistError::InvalidNodeShape {
                reason: "register input and output ports must have equal width".to_string(),
            });
        }
        self.add_node(name, NodeKind::Register, vec![input], vec![output])
    }

    /// Adds a pass-through node. Total input width must equal total output
    /// width; wires pass straight through in (port, bit) order.
    pub fn add_pass_through(
        &mut self,
        name: Ident,
        input_ports: Vec<Port>,
        output_ports: Vec<Port>,
    ) -> Result<NodeId, NetlistError> {
        let in_width: u32 = input_ports.iter().map(|p| p.width).sum();
        let out_width: u32 = output_ports.iter().map(|p| p.width).sum();
        if in_width != out_width {
            return Err(NetlistError::InvalidNodeShape {
                reason: "pass-through input and output widths must match".to_string(),
            });
        }
        self.add_node(name, NodeKind::PassThrough, input_ports, output_ports)
    }

    /// Adds an instantiation of another concrete module.
    pub fn add_instance(
        &mut self,
        name: Ident,
        module: Ident,
        input_ports: Vec<Port>,
        output_ports: Vec<Port>,
    ) -> Result<NodeId, NetlistError> {
        self.add_node(
            name,
            NodeKind::ModuleInstance { module },
            input_ports,
            output_ports,
        )
    }

    /// Returns the node with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the ID was not allocated by this module.
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    /// Looks up a node by name.
    pub fn node_by_name(&self, name: Ident) -> Option<NodeId> {
        self.names.get(&name).copied()
    }

    /// Iterates over all nodes in allocation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns the total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of register nodes.
    pub fn register_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_register()).count()
    }

    /// Returns `true` if the module contains at least one register node.
    pub fn has_registers(&self) -> bool {
        self.nodes.values().any(|n| n.is_register())
    }

    fn check_input_wire(&self, wire: InputWire) -> Result<(), NetlistError> {
        let port = self
            .nodes
            .try_get(wire.node)
            .and_then(|n| n.input_ports.get(wire.port as usize));
        match port {
            Some(p) if wire.bit < p.width => Ok(()),
            _ => Err(NetlistError::UnknownInputWire { wire }),
        }
    }

    fn check_output_wire(&self, wire: OutputWire) -> Result<(), NetlistError> {
        let port = self
            .nodes
            .try_get(wire.node)
            .and_then(|n| n.output_ports.get(wire.port as usize));
        match port {
            Some(p) if wire.bit < p.width => Ok(()),
            _ => Err(NetlistError::UnknownOutputWire { wire }),
        }
    }

    /// Connects an output wire to an input wire.
    ///
    /// Fails if either wire does not exist or the input wire already has a
    /// driver (every input wire has exactly one source).
    pub fn connect(&mut self, source: OutputWire, sink: InputWire) -> Result<(), NetlistError> {
        self.check_output_wire(source)?;
        self.check_input_wire(sink)?;
        if let Some(&driver) = self.drivers.get(&sink) {
            return Err(NetlistError::AlreadyDriven { sink, driver });
        }
        self.drivers.insert(sink, source);
        Ok(())
    }

    /// Removes the connection driving the given input wire, returning the
    /// wire that was driving it.
    pub fn disconnect(&mut self, sink: InputWire) -> Result<OutputWire, NetlistError> {
        self.drivers
            .remove(&sink)
            .ok_or(NetlistError::NotConnected { sink })
    }

    /// Returns the output wire driving the given input wire, if connected.
    pub fn driver_of(&self, sink: InputWire) -> Option<OutputWire> {
        self.drivers.get(&sink).copied()
    }

    /// Returns the number of connections in the module.
    pub fn connection_count(&self) -> usize {
        self.drivers.len()
    }

    /// Returns all connections in deterministic (node, port, bit) order of
    /// the driven input wire.
    pub fn connections(&self) -> Vec<Connection> {
        let mut out = Vec::with_capacity(self.drivers.len());
        for node in self.nodes.values() {
            for sink in node.input_wires() {
                if let Some(source) = self.driver_of(sink) {
                    out.push(Connection { source, sink });
                }
            }
        }
        out
    }

    /// Returns the input wires driven by the given output wire, in
    /// deterministic (node, port, bit) order.
    pub fn sinks_of(&self, source: OutputWire) -> Vec<InputWire> {
        self.connections()
            .into_iter()
            .filter(|c| c.source == source)
            .map(|c| c.sink)
            .collect()
    }
}
