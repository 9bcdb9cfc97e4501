//! Circuit retiming for the takt HDL compiler.
//!
//! This crate implements Leiserson-Saxe optimal retiming over the elaborated
//! netlist. Each module is lowered to a weighted graph (propagation delay
//! per node, register count per connection), the smallest feasible clock
//! period is found by a binary search over the candidate periods, and the
//! module is rebuilt with its registers relocated accordingly. Modules are
//! independent, so the run is parallel at module granularity.
//!
//! # Usage
//!
//! ```ignore
//! use takt_retime::{retime_modules, RetimeOptions};
//!
//! // Retime every module holding at least one register
//! let outcome = retime_modules(modules, &delay, &interner, &sink, &RetimeOptions::default())?;
//! for module in &outcome.report.modules {
//!     println!(
//!         "{}: period {} -> {}",
//!         module.name, module.period_before, module.period_after
//!     );
//! }
//! ```
//!
//! # Architecture
//!
//! - [`graph`] — weighted circuit graph and retiming lag vectors
//! - [`convert`] — lowering a netlist module into the circuit graph
//! - [`combinational`] — per-node combinational delays and the clock period
//! - [`candidates`] — the clock periods any retiming could possibly reach
//! - [`search`] — feasibility attempts and the search for the optimum
//! - [`apply`] — rebuilding a module from a computed retiming
//! - [`dot`] — Graphviz dumps of circuit graphs
//! - [`report`] — per-module and aggregate retiming summaries

#![warn(missing_docs)]

pub mod apply;
pub mod candidates;
pub mod combinational;
pub mod convert;
pub mod dot;
pub mod error;
pub mod graph;
pub mod ids;
pub mod report;
pub mod search;

pub use apply::{apply_retiming, RegisterNamer};
pub use candidates::candidate_periods;
pub use combinational::{clock_period, combinational_delays};
pub use convert::graph_from_module;
pub use dot::graph_to_dot;
pub use error::RetimeError;
pub use graph::{CircuitEdge, CircuitGraph, CircuitNode, Retiming};
pub use ids::{GraphEdgeId, GraphNodeId};
pub use report::{ModuleReport, RetimeReport};
pub use search::{attempt_retiming, minimize_clock_period, RetimingSolution};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use takt_common::{Interner, TaktResult};
use takt_delay::PropagationDelay;
use takt_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use takt_netlist::Module;

/// Options controlling a retiming run.
#[derive(Debug, Clone, Default)]
pub struct RetimeOptions {
    /// Directory to write pre/post-retiming Graphviz dumps into, if set.
    pub dump_graphs: Option<PathBuf>,
}

/// The modules after a retiming run, plus the aggregate report.
#[derive(Debug)]
pub struct RetimeOutcome {
    /// All modules in their original order: retimed where possible,
    /// untouched where skipped or failed.
    pub modules: Vec<Module>,
    /// What happened to each module.
    pub report: RetimeReport,
}

enum ModuleOutcome {
    Retimed(Module, ModuleReport),
    Skipped(Module),
    Failed(Module, RetimeError),
}

/// Retimes a single module.
///
/// Lowers the module to its weighted graph, finds the smallest feasible
/// clock period, and rebuilds the module to match. The input module is
/// never mutated. Combinational cycles surface as
/// [`RetimeError::CombinationalCycle`] before any search work happens.
pub fn retime_module(
    module: &Module,
    delay: &dyn PropagationDelay,
    interner: &Interner,
    options: &RetimeOptions,
) -> Result<(Module, ModuleReport), RetimeError> {
    let name = interner.resolve(module.name).to_string();
    let graph = graph_from_module(module, delay, interner)?;

    // Runs the delay analysis up front: it rejects combinational cycles
    // before the search starts and anchors the report's baseline.
    let identity = Retiming::identity(&graph);
    let period_before = clock_period(&graph, &identity)?;
    let solution = minimize_clock_period(&graph)?;

    if let Some(dir) = &options.dump_graphs {
        dump_graph(
            &graph,
            &identity,
            dir,
            &format!("{name}.pre.dot"),
            &format!("Pre-Retiming: {name}"),
        )?;
        dump_graph(
            &graph,
            &solution.retiming,
            dir,
            &format!("{name}.post.dot"),
            &format!("Post-Retiming: {name}"),
        )?;
    }

    let mut namer = RegisterNamer::new();
    let rebuilt = apply_retiming(module, &graph, &solution.retiming, interner, &mut namer)?;

    let report = ModuleReport {
        name,
        period_before,
        period_after: solution.period,
        registers_before: module.register_count(),
        registers_after: rebuilt.register_count(),
    };
    Ok((rebuilt, report))
}

/// Retimes every module that holds at least one register, in parallel.
///
/// Modules without registers pass through untouched. A module with a
/// combinational cycle (or a failed graph dump) is reported through the
/// sink and passes through unretimed; independent modules still proceed.
/// Internal errors abort the whole run.
pub fn retime_modules(
    modules: Vec<Module>,
    delay: &dyn PropagationDelay,
    interner: &Interner,
    sink: &DiagnosticSink,
    options: &RetimeOptions,
) -> TaktResult<RetimeOutcome> {
    let outcomes: Vec<ModuleOutcome> = modules
        .into_par_iter()
        .map(|module| {
            if !module.has_registers() {
                return ModuleOutcome::Skipped(module);
            }
            match retime_module(&module, delay, interner, options) {
                Ok((rebuilt, report)) => ModuleOutcome::Retimed(rebuilt, report),
                Err(err) => ModuleOutcome::Failed(module, err),
            }
        })
        .collect();

    let mut report = RetimeReport::empty();
    let mut rebuilt = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            ModuleOutcome::Retimed(module, module_report) => {
                report.record(module_report);
                rebuilt.push(module);
            }
            ModuleOutcome::Skipped(module) => {
                report.record_skipped();
                rebuilt.push(module);
            }
            ModuleOutcome::Failed(module, err) => {
                let name = interner.resolve(module.name).to_string();
                match err {
                    RetimeError::CombinationalCycle { nodes } => {
                        sink.emit(
                            Diagnostic::error(
                                DiagnosticCode::new(Category::Netlist, 201),
                                format!("combinational cycle detected in module '{name}'"),
                            )
                            .with_module(name.as_str())
                            .with_note(format!(
                                "the cycle passes through: {}",
                                nodes.join(" -> ")
                            ))
                            .with_help("insert a register on one of the feedback connections"),
                        );
                    }
                    RetimeError::DumpIo(io_err) => {
                        sink.emit(
                            Diagnostic::error(
                                DiagnosticCode::new(Category::Error, 301),
                                format!(
                                    "failed to write graph dump for module '{name}': {io_err}"
                                ),
                            )
                            .with_module(name.as_str()),
                        );
                    }
                    RetimeError::Internal(internal) => return Err(internal),
                }
                report.record_failed();
                rebuilt.push(module);
            }
        }
    }

    Ok(RetimeOutcome {
        modules: rebuilt,
        report,
    })
}

fn dump_graph(
    graph: &CircuitGraph,
    retiming: &Retiming,
    dir: &Path,
    file_name: &str,
    title: &str,
) -> Result<(), RetimeError> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(file_name), graph_to_dot(graph, retiming, title))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use takt_delay::UniformDelay;
    use takt_netlist::{InputWire, NodeId, OperatorKind, OutputWire, Port};

    fn port(interner: &Interner, name: &str, width: u32) -> Port {
        Port::new(interner.get_or_intern(name), width)
    }

    fn link(module: &mut Module, from: NodeId, to: NodeId) {
        module
            .connect(
                OutputWire {
                    node: from,
                    port: 0,
                    bit: 0,
                },
                InputWire {
                    node: to,
                    port: 0,
                    bit: 0,
                },
            )
            .unwrap();
    }

    /// in -> r0 -> not_a -> not_b -> not_c -> out, all one bit wide.
    fn inverter_chain(interner: &Interner, name: &str) -> Module {
        let mut module = Module::new(interner.get_or_intern(name));
        let input = module
            .add_input(interner.get_or_intern("in"), vec![port(interner, "value", 1)])
            .unwrap();
        let r0 = module
            .add_register(
                interner.get_or_intern("r0"),
                port(interner, "d", 1),
                port(interner, "q", 1),
            )
            .unwrap();
        let mut prev = r0;
        for not_name in ["not_a", "not_b", "not_c"] {
            let id = module
                .add_operator(
                    interner.get_or_intern(not_name),
                    OperatorKind::BitwiseNot,
                    vec![port(interner, "in", 1)],
                    vec![port(interner, "out", 1)],
                )
                .unwrap();
            link(&mut module, prev, id);
            prev = id;
        }
        let output = module
            .add_output(interner.get_or_intern("out"), vec![port(interner, "value", 1)])
            .unwrap();
        link(&mut module, input, r0);
        link(&mut module, prev, output);
        module
    }

    fn register_free(interner: &Interner, name: &str) -> Module {
        let mut module = Module::new(interner.get_or_intern(name));
        let input = module
            .add_input(interner.get_or_intern("in"), vec![port(interner, "value", 1)])
            .unwrap();
        let not0 = module
            .add_operator(
                interner.get_or_intern("not_0"),
                OperatorKind::BitwiseNot,
                vec![port(interner, "in", 1)],
                vec![port(interner, "out", 1)],
            )
            .unwrap();
        let output = module
            .add_output(interner.get_or_intern("out"), vec![port(interner, "value", 1)])
            .unwrap();
        link(&mut module, input, not0);
        link(&mut module, not0, output);
        module
    }

    #[test]
    fn full_pipeline_spreads_registers() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let modules = vec![inverter_chain(&interner, "top")];

        let outcome = retime_modules(
            modules,
            &UniformDelay(1),
            &interner,
            &sink,
            &RetimeOptions::default(),
        )
        .unwrap();

        assert!(!sink.has_errors());
        assert_eq!(outcome.report.modules_total, 1);
        assert_eq!(outcome.report.modules_retimed, 1);

        let module_report = &outcome.report.modules[0];
        assert_eq!(module_report.name, "top");
        assert_eq!(module_report.period_before, 4);
        assert_eq!(module_report.period_after, 1);
        assert_eq!(module_report.registers_before, 1);
        assert_eq!(module_report.registers_after, 4);

        // Re-analyzing the rebuilt module confirms the achieved period.
        let rebuilt = &outcome.modules[0];
        assert_eq!(rebuilt.register_count(), 4);
        let graph = graph_from_module(rebuilt, &UniformDelay(1), &interner).unwrap();
        assert_eq!(
            clock_period(&graph, &Retiming::identity(&graph)).unwrap(),
            1
        );
    }

    #[test]
    fn combinational_cycle_is_reported_and_module_passes_through() {
        let interner = Interner::new();
        let mut module = Module::new(interner.get_or_intern("loopy"));
        let input = module
            .add_input(interner.get_or_intern("in"), vec![port(&interner, "value", 1)])
            .unwrap();
        let r0 = module
            .add_register(
                interner.get_or_intern("r0"),
                port(&interner, "d", 1),
                port(&interner, "q", 1),
            )
            .unwrap();
        let and0 = module
            .add_operator(
                interner.get_or_intern("and_0"),
                OperatorKind::BitwiseAnd,
                vec![port(&interner, "lhs", 1), port(&interner, "rhs", 1)],
                vec![port(&interner, "out", 1)],
            )
            .unwrap();
        link(&mut module, input, r0);
        link(&mut module, r0, and0);
        // The AND gate feeds itself with no register in between.
        module
            .connect(
                OutputWire {
                    node: and0,
                    port: 0,
                    bit: 0,
                },
                InputWire {
                    node: and0,
                    port: 1,
                    bit: 0,
                },
            )
            .unwrap();

        let sink = DiagnosticSink::new();
        let outcome = retime_modules(
            vec![module],
            &UniformDelay(1),
            &interner,
            &sink,
            &RetimeOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.report.modules_failed, 1);
        assert_eq!(outcome.report.modules_retimed, 0);
        assert!(sink.has_errors());
        let diagnostics = sink.take_all();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(format!("{}", diagnostics[0].code), "N201");
        assert_eq!(diagnostics[0].module.as_deref(), Some("loopy"));
        assert!(diagnostics[0].notes[0].contains("and_0"));

        // The module comes back unretimed.
        let untouched = &outcome.modules[0];
        assert_eq!(untouched.register_count(), 1);
        assert!(untouched
            .node_by_name(interner.get_or_intern("r0"))
            .is_some());
    }

    #[test]
    fn register_free_modules_are_skipped() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let modules = vec![register_free(&interner, "plain")];

        let outcome = retime_modules(
            modules,
            &UniformDelay(1),
            &interner,
            &sink,
            &RetimeOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.report.modules_skipped, 1);
        assert_eq!(outcome.report.modules_retimed, 0);
        assert!(outcome.report.modules.is_empty());
        assert!(!sink.has_errors());
        assert_eq!(outcome.modules[0].connection_count(), 2);
    }

    #[test]
    fn module_order_is_preserved() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let modules = vec![
            inverter_chain(&interner, "alpha"),
            register_free(&interner, "beta"),
            inverter_chain(&interner, "gamma"),
        ];

        let outcome = retime_modules(
            modules,
            &UniformDelay(1),
            &interner,
            &sink,
            &RetimeOptions::default(),
        )
        .unwrap();

        let names: Vec<&str> = outcome
            .modules
            .iter()
            .map(|m| interner.resolve(m.name))
            .collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert_eq!(outcome.report.modules_total, 3);
        assert_eq!(outcome.report.modules_retimed, 2);
        assert_eq!(outcome.report.modules_skipped, 1);
    }

    #[test]
    fn internal_errors_halt_the_run() {
        let interner = Interner::new();
        let mut module = Module::new(interner.get_or_intern("broken"));
        let input = module
            .add_input(interner.get_or_intern("in"), vec![port(&interner, "value", 1)])
            .unwrap();
        let r0 = module
            .add_register(
                interner.get_or_intern("r0"),
                port(&interner, "d", 1),
                port(&interner, "q", 1),
            )
            .unwrap();
        link(&mut module, input, r0);
        // An operator whose input was never wired up.
        module
            .add_operator(
                interner.get_or_intern("not_0"),
                OperatorKind::BitwiseNot,
                vec![port(&interner, "in", 1)],
                vec![port(&interner, "out", 1)],
            )
            .unwrap();

        let sink = DiagnosticSink::new();
        let err = retime_modules(
            vec![module],
            &UniformDelay(1),
            &interner,
            &sink,
            &RetimeOptions::default(),
        )
        .unwrap_err();
        assert!(err.message.contains("has no driver"));
    }

    #[test]
    fn dump_files_are_written() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let dir = std::env::temp_dir().join("takt_retime_dump_test");
        let _ = std::fs::remove_dir_all(&dir);

        let options = RetimeOptions {
            dump_graphs: Some(dir.clone()),
        };
        let outcome = retime_modules(
            vec![inverter_chain(&interner, "top")],
            &UniformDelay(1),
            &interner,
            &sink,
            &options,
        )
        .unwrap();
        assert_eq!(outcome.report.modules_retimed, 1);

        let pre = std::fs::read_to_string(dir.join("top.pre.dot")).unwrap();
        let post = std::fs::read_to_string(dir.join("top.post.dot")).unwrap();
        assert!(pre.starts_with("digraph \"Pre-Retiming: top\" {"));
        assert!(post.starts_with("digraph \"Post-Retiming: top\" {"));
        // The pre dump still shows the single input-side register.
        assert!(pre.contains("label=\"1\""));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn reexports_available() {
        // Verify all public types are accessible
        let _ = CircuitGraph::new();
        let _ = RetimeReport::empty();
        let _ = RetimeOptions::default();
        let _ = RegisterNamer::new();
        let _ = GraphNodeId::from_raw(0);
        let _ = GraphEdgeId::from_raw(0);
    }
}
