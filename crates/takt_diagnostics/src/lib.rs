//! Diagnostic creation, severity management, and terminal rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity
//! levels, error codes, notes, and help text. Netlist-level diagnostics have
//! no source spans; a diagnostic instead names the module it was raised in.
//! The thread-safe [`DiagnosticSink`] accumulates diagnostics from parallel
//! compilation stages, and [`DiagnosticRenderer`] implementations format
//! them for display.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
