//! Width-sliced propagation delay tables.
//!
//! Delay lookup is keyed on the operator kind and the node's total output
//! wire count. Each operator model holds sorted, non-overlapping width
//! slices over a per-operator default delay; everything else falls back to
//! the table's global default.

use crate::error::DelayModelError;
use std::cmp::Ordering;
use std::collections::HashMap;
use takt_netlist::{Node, NodeKind, OperatorKind};

/// A propagation delay model assigning every netlist node a combinational
/// delay weight.
///
/// Lookups must be read-only and thread-safe; the retiming engine calls
/// [`for_node`](PropagationDelay::for_node) from parallel workers, once per
/// node per module.
pub trait PropagationDelay: Send + Sync {
    /// Returns the propagation delay of the given node.
    fn for_node(&self, node: &Node) -> u64;
}

/// A model assigning the same delay to every node.
#[derive(Debug, Clone, Copy)]
pub struct UniformDelay(pub u64);

impl PropagationDelay for UniformDelay {
    fn for_node(&self, _node: &Node) -> u64 {
        self.0
    }
}

/// A delay entry covering a half-open range of output widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthSlice {
    /// First output wire count the slice covers (inclusive).
    pub from: u32,
    /// First output wire count past the slice (exclusive); `None` means the
    /// slice is unbounded above.
    pub until: Option<u32>,
    /// The delay for widths inside the slice.
    pub delay: u64,
}

impl WidthSlice {
    fn contains(&self, width: u32) -> bool {
        width >= self.from && self.until.is_none_or(|until| width < until)
    }
}

/// The delay model for a single operator: width slices over a default.
#[derive(Debug, Clone)]
pub struct OperatorDelays {
    slices: Vec<WidthSlice>,
    default: u64,
}

impl OperatorDelays {
    /// Builds an operator model, sorting the slices and rejecting empty and
    /// overlapping ones. The operator name is used in error messages only.
    pub fn new(
        operator: &str,
        mut slices: Vec<WidthSlice>,
        default: u64,
    ) -> Result<Self, DelayModelError> {
        for slice in &slices {
            if slice.until.is_some_and(|until| until <= slice.from) {
                return Err(DelayModelError::InvalidSlice(operator.to_string()));
            }
        }
        slices.sort_by_key(|slice| slice.from);
        for pair in slices.windows(2) {
            if pair[0].until.is_none_or(|until| until > pair[1].from) {
                return Err(DelayModelError::OverlappingSlices(operator.to_string()));
            }
        }
        Ok(Self { slices, default })
    }

    /// Looks up the delay for the given output width.
    pub fn delay_for_width(&self, width: u32) -> u64 {
        let found = self.slices.binary_search_by(|slice| {
            if slice.contains(width) {
                Ordering::Equal
            } else if slice.from > width {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        });
        match found {
            Ok(index) => self.slices[index].delay,
            Err(_) => self.default,
        }
    }
}

/// A width-sliced delay model, usually loaded from a TOML file.
///
/// Resolution order: non-operator nodes get the global default; operators
/// without a dedicated model get the global default; operators with a model
/// but no slice covering the node's output width get that model's default;
/// otherwise the matching slice's delay.
#[derive(Debug, Clone, Default)]
pub struct DelayTable {
    default: u64,
    operators: HashMap<OperatorKind, OperatorDelays>,
}

impl DelayTable {
    /// Creates a table with only a global default delay.
    pub fn with_default(default: u64) -> Self {
        Self {
            default,
            operators: HashMap::new(),
        }
    }

    /// Adds or replaces the model for one operator.
    pub fn set_operator(&mut self, op: OperatorKind, model: OperatorDelays) {
        self.operators.insert(op, model);
    }

    /// The global default delay.
    pub fn default_delay(&self) -> u64 {
        self.default
    }
}

impl PropagationDelay for DelayTable {
    fn for_node(&self, node: &Node) -> u64 {
        match &node.kind {
            NodeKind::Operator { op } => match self.operators.get(op) {
                Some(model) => model.delay_for_width(node.output_wire_count()),
                None => self.default,
            },
            _ => self.default,
        }
    }
}
