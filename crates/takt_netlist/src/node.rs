//! Node definitions for boundary ports, operators, and register primitives.
//!
//! A [`Node`] is one concrete circuit element after elaboration. Its
//! [`NodeKind`] is a closed tagged union; every place with kind-specific
//! behavior (delay lookup, exclusion from the weighted graph, Verilog
//! lowering) matches on it exhaustively.

use crate::ids::NodeId;
use crate::wire::{InputWire, OutputWire};
use serde::{Deserialize, Serialize};
use takt_common::Ident;

/// A named, fixed-width port on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The port name.
    pub name: Ident,
    /// Port width in bits. Always ≥ 1.
    pub width: u32,
}

impl Port {
    /// Creates a new port.
    pub fn new(name: Ident, width: u32) -> Self {
        Self { name, width }
    }
}

/// A built-in combinational operator.
///
/// These are the predefined functions of the source language; the delay
/// model is keyed on this vocabulary plus the operator's output bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    /// Integer addition.
    Addition,
    /// Integer subtraction.
    Subtraction,
    /// Integer multiplication.
    Multiplication,
    /// Logical left shift.
    LeftShift,
    /// Logical right shift.
    RightShift,
    /// Unsigned less-than comparison.
    LessThan,
    /// Unsigned greater-than comparison.
    GreaterThan,
    /// Unsigned less-than-or-equal comparison.
    LessThanEquals,
    /// Unsigned greater-than-or-equal comparison.
    GreaterThanEquals,
    /// Equality comparison.
    Equals,
    /// Inequality comparison.
    NotEquals,
    /// Logical AND (single-bit result).
    LogicalAnd,
    /// Logical OR (single-bit result).
    LogicalOr,
    /// Logical NOT (single-bit result).
    LogicalNot,
    /// Bitwise AND.
    BitwiseAnd,
    /// Bitwise OR.
    BitwiseOr,
    /// Bitwise XOR.
    BitwiseXor,
    /// Bitwise NOT.
    BitwiseNot,
    /// A constant literal driver.
    Literal,
}

/// The kind of a node, distinguishing boundary ports, combinational body
/// nodes, and register primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// A module boundary input. Drives its output ports from outside the
    /// module; has no input ports.
    Input,
    /// A module boundary output. Consumes its input ports from inside the
    /// module; has no output ports.
    Output,
    /// An invocation of a built-in combinational operator.
    Operator {
        /// The operator being invoked.
        op: OperatorKind,
    },
    /// A single-cycle register primitive: one input port and one output
    /// port of equal width, bit `i` in ↔ bit `i` out one clock later.
    ///
    /// Registers never appear in the weighted circuit graph; the retiming
    /// engine represents them purely as edge weight and re-materializes
    /// them when a retiming is applied.
    Register,
    /// A wire-through placeholder with no logic; carries its inputs to its
    /// outputs unchanged.
    PassThrough,
    /// An instantiation of another concrete (already elaborated) module.
    ModuleInstance {
        /// The name of the instantiated module.
        module: Ident,
    },
}

/// A single node in a module's netlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The unique ID of this node within its module.
    pub id: NodeId,
    /// The node name, unique within its module.
    pub name: Ident,
    /// What this node is.
    pub kind: NodeKind,
    /// The node's input ports, in declaration order.
    pub input_ports: Vec<Port>,
    /// The node's output ports, in declaration order.
    pub output_ports: Vec<Port>,
}

impl Node {
    /// Returns the total number of input wires (sum of input port widths).
    pub fn input_wire_count(&self) -> u32 {
        self.input_ports.iter().map(|p| p.width).sum()
    }

    /// Returns the total number of output wires (sum of output port widths).
    pub fn output_wire_count(&self) -> u32 {
        self.output_ports.iter().map(|p| p.width).sum()
    }

    /// Returns `true` if this node is a register primitive.
    pub fn is_register(&self) -> bool {
        matches!(self.kind, NodeKind::Register)
    }

    /// Returns `true` if this node is a module boundary input or output.
    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, NodeKind::Input | NodeKind::Output)
    }

    /// Iterates over this node's input wires in (port, bit) order.
    pub fn input_wires(&self) -> impl Iterator<Item = InputWire> + '_ {
        let node = self.id;
        self.input_ports
            .iter()
            .enumerate()
            .flat_map(move |(port, p)| {
                (0..p.width).map(move |bit| InputWire {
                    node,
                    port: port as u32,
                    bit,
                })
            })
    }

    /// Iterates over this node's output wires in (port, bit) order.
    pub fn output_wires(&self) -> impl Iterator<Item = OutputWire> + '_ {
        let node = self.id;
        self.output_ports
            .iter()
            .enumerate()
            .flat_map(move |(port, p)| {
                (0..p.width).map(move |bit| OutputWire {
                    node,
                    port: port as u32,
                    bit,
                })
            })
    }
}
