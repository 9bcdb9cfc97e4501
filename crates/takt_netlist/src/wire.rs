//! Wire addressing for point-to-point netlist connections.
//!
//! A wire is one bit position on one port of one node, addressed as
//! `(node, port index, bit index)`. Input and output wires are distinct
//! types so a connection can only ever run from an output to an input.

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit position on a node's input interface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InputWire {
    /// The node this wire belongs to.
    pub node: NodeId,
    /// Index into the node's input port list.
    pub port: u32,
    /// Bit position within the port.
    pub bit: u32,
}

/// One bit position on a node's output interface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct OutputWire {
    /// The node this wire belongs to.
    pub node: NodeId,
    /// Index into the node's output port list.
    pub port: u32,
    /// Bit position within the port.
    pub bit: u32,
}

/// A single point-to-point link from an output wire to an input wire.
///
/// Connections are the payload the retiming engine carries across its
/// weighted edges and reattaches after registers are relocated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Connection {
    /// The driving output wire.
    pub source: OutputWire,
    /// The driven input wire.
    pub sink: InputWire,
}

impl fmt::Display for InputWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}.in{}[{}]", self.node.as_raw(), self.port, self.bit)
    }
}

impl fmt::Display for OutputWire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}.out{}[{}]", self.node.as_raw(), self.port, self.bit)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.sink)
    }
}
