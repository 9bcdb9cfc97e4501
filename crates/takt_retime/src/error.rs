//! Error types for the retiming engine.

use takt_common::InternalError;

/// Errors raised while retiming a module.
///
/// A [`CombinationalCycle`](RetimeError::CombinationalCycle) is a defect in
/// the circuit being compiled and is reported to the user as a diagnostic.
/// An [`Internal`](RetimeError::Internal) error is a defect in the engine
/// itself and halts compilation.
#[derive(Debug, thiserror::Error)]
pub enum RetimeError {
    /// The circuit contains a cycle with no registers on it. Such a loop is
    /// combinational feedback and cannot be retimed away.
    #[error("combinational cycle through: {}", .nodes.join(" -> "))]
    CombinationalCycle {
        /// Names of the nodes trapped on (or behind) the cycle.
        nodes: Vec<String>,
    },

    /// An invariant the algorithm relies on was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// Writing a Graphviz dump of the circuit graph failed.
    #[error("failed to write graph dump: {0}")]
    DumpIo(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinational_cycle_display() {
        let err = RetimeError::CombinationalCycle {
            nodes: vec!["mul_0".to_string(), "add_1".to_string()],
        };
        assert_eq!(
            format!("{err}"),
            "combinational cycle through: mul_0 -> add_1"
        );
    }

    #[test]
    fn internal_display_is_transparent() {
        let err: RetimeError = InternalError::new("mismatched edge weights").into();
        assert_eq!(
            format!("{err}"),
            "internal compiler error: mismatched edge weights"
        );
    }

    #[test]
    fn dump_io_display() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = RetimeError::DumpIo(io);
        assert_eq!(format!("{err}"), "failed to write graph dump: denied");
    }

    #[test]
    fn internal_from_conversion() {
        fn fails() -> Result<(), RetimeError> {
            Err(InternalError::new("no feasible candidate"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(RetimeError::Internal(_))));
    }
}
