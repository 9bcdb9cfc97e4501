//! Propagation delay models for netlist nodes.
//!
//! Provides the [`PropagationDelay`] trait consumed by the retiming engine,
//! a width-sliced per-operator [`DelayTable`], and a TOML loader for delay
//! model files.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod table;

pub use error::DelayModelError;
pub use loader::{delay_model_from_str, load_delay_model};
pub use table::{DelayTable, OperatorDelays, PropagationDelay, UniformDelay, WidthSlice};
