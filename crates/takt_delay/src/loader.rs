//! Delay model file loading and validation.

use crate::error::DelayModelError;
use crate::table::{DelayTable, OperatorDelays, WidthSlice};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use takt_netlist::OperatorKind;

/// Raw delay model file contents before validation.
#[derive(Debug, Deserialize)]
struct RawDelayModel {
    /// Global default delay for every node without a more specific entry.
    #[serde(default)]
    default: u64,
    /// Per-operator models keyed by snake_case operator name.
    #[serde(default)]
    operators: BTreeMap<String, RawOperatorModel>,
}

#[derive(Debug, Deserialize)]
struct RawOperatorModel {
    /// Delay for widths no slice covers.
    #[serde(default)]
    default: u64,
    /// Width slices, in any order.
    #[serde(default)]
    widths: Vec<RawSlice>,
}

#[derive(Debug, Deserialize)]
struct RawSlice {
    from: u32,
    until: Option<u32>,
    delay: u64,
}

/// Loads and validates a delay model from a TOML file.
pub fn load_delay_model(path: &Path) -> Result<DelayTable, DelayModelError> {
    let content = std::fs::read_to_string(path)?;
    delay_model_from_str(&content)
}

/// Parses and validates a delay model from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn delay_model_from_str(content: &str) -> Result<DelayTable, DelayModelError> {
    let raw: RawDelayModel =
        toml::from_str(content).map_err(|e| DelayModelError::ParseError(e.to_string()))?;
    let mut table = DelayTable::with_default(raw.default);
    for (key, model) in &raw.operators {
        let op = operator_from_key(key)?;
        let slices = model
            .widths
            .iter()
            .map(|s| WidthSlice {
                from: s.from,
                until: s.until,
                delay: s.delay,
            })
            .collect();
        table.set_operator(op, OperatorDelays::new(key, slices, model.default)?);
    }
    Ok(table)
}

/// Maps a snake_case operator key from the model file to an operator kind.
///
/// Literal drivers are intentionally not nameable; constants always take the
/// global default delay.
fn operator_from_key(key: &str) -> Result<OperatorKind, DelayModelError> {
    match key {
        "less_than" => Ok(OperatorKind::LessThan),
        "greater_than" => Ok(OperatorKind::GreaterThan),
        "less_than_equals" => Ok(OperatorKind::LessThanEquals),
        "greater_than_equals" => Ok(OperatorKind::GreaterThanEquals),
        "equals" => Ok(OperatorKind::Equals),
        "not_equals" => Ok(OperatorKind::NotEquals),
        "logical_and" => Ok(OperatorKind::LogicalAnd),
        "logical_or" => Ok(OperatorKind::LogicalOr),
        "logical_not" => Ok(OperatorKind::LogicalNot),
        "bitwise_and" => Ok(OperatorKind::BitwiseAnd),
        "bitwise_or" => Ok(OperatorKind::BitwiseOr),
        "bitwise_xor" => Ok(OperatorKind::BitwiseXor),
        "bitwise_not" => Ok(OperatorKind::BitwiseNot),
        "addition" => Ok(OperatorKind::Addition),
        "subtraction" => Ok(OperatorKind::Subtraction),
        "multiplication" => Ok(OperatorKind::Multiplication),
        "left_shift" => Ok(OperatorKind::LeftShift),
        "right_shift" => Ok(OperatorKind::RightShift),
        other => Err(DelayModelError::UnknownOperator(other.to_string())),
    }
}
