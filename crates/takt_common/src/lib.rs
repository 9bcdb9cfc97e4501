//! Shared foundational types used across the takt retiming toolchain.
//!
//! This crate provides interned identifiers for netlist entities and the
//! common result types that distinguish internal compiler defects from
//! user-facing diagnostics.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, TaktResult};
