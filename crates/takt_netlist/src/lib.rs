//! The elaborated netlist IR consumed and produced by the retiming engine.
//!
//! A [`Module`] is a flat, concrete circuit: arena-allocated [`Node`]s
//! (boundary ports, operators, registers, pass-throughs, module instances)
//! joined by point-to-point wire [`Connection`]s. Every input wire has
//! exactly one driver; output wires may fan out freely. Elaboration builds
//! modules through the typed constructors on [`Module`], the retiming
//! engine replaces them wholesale, and Verilog emission walks the result.

#![warn(missing_docs)]

pub mod arena;
pub mod ids;
pub mod module;
pub mod node;
pub mod wire;

pub use arena::{Arena, ArenaId};
pub use ids::NodeId;
pub use module::{Module, NetlistError};
pub use node::{Node, NodeKind, OperatorKind, Port};
pub use wire::{Connection, InputWire, OutputWire};
