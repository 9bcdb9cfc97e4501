//! Summary data describing what a retiming run did.

use serde::{Deserialize, Serialize};

/// The before/after numbers for one retimed module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    /// The module name.
    pub name: String,
    /// Clock period of the module as it arrived.
    pub period_before: u64,
    /// Clock period after the retiming was applied.
    pub period_after: u64,
    /// Register nodes in the module as it arrived.
    pub registers_before: usize,
    /// Register nodes after the retiming was applied.
    pub registers_after: usize,
}

/// Aggregate outcome of retiming a set of modules.
///
/// `modules` holds one entry per module that went through the engine;
/// skipped and failed modules are only tallied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetimeReport {
    /// Per-module results for every retimed module.
    pub modules: Vec<ModuleReport>,
    /// Modules seen in total.
    pub modules_total: usize,
    /// Modules retimed (including ones already at their optimum).
    pub modules_retimed: usize,
    /// Modules without registers, passed through untouched.
    pub modules_skipped: usize,
    /// Modules aborted by a user-facing error such as a combinational cycle.
    pub modules_failed: usize,
}

impl RetimeReport {
    /// Creates an empty report.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
            modules_total: 0,
            modules_retimed: 0,
            modules_skipped: 0,
            modules_failed: 0,
        }
    }

    /// Records a module the engine retimed.
    pub fn record(&mut self, module: ModuleReport) {
        self.modules_total += 1;
        self.modules_retimed += 1;
        self.modules.push(module);
    }

    /// Records a module passed through without registers.
    pub fn record_skipped(&mut self) {
        self.modules_total += 1;
        self.modules_skipped += 1;
    }

    /// Records a module aborted by a user-facing error.
    pub fn record_failed(&mut self) {
        self.modules_total += 1;
        self.modules_failed += 1;
    }
}

impl Default for RetimeReport {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ModuleReport {
        ModuleReport {
            name: "alu".to_string(),
            period_before: 12,
            period_after: 5,
            registers_before: 3,
            registers_after: 7,
        }
    }

    #[test]
    fn empty_report_is_zeroed() {
        let report = RetimeReport::empty();
        assert!(report.modules.is_empty());
        assert_eq!(report.modules_total, 0);
        assert_eq!(report.modules_retimed, 0);
        assert_eq!(report.modules_skipped, 0);
        assert_eq!(report.modules_failed, 0);
    }

    #[test]
    fn recording_tallies_outcomes() {
        let mut report = RetimeReport::empty();
        report.record(sample());
        report.record(ModuleReport {
            name: "fifo".to_string(),
            ..sample()
        });
        report.record_skipped();
        report.record_failed();

        assert_eq!(report.modules_total, 4);
        assert_eq!(report.modules_retimed, 2);
        assert_eq!(report.modules_skipped, 1);
        assert_eq!(report.modules_failed, 1);
        assert_eq!(report.modules.len(), 2);
        assert_eq!(report.modules[1].name, "fifo");
    }

    #[test]
    fn serde_roundtrip() {
        let mut report = RetimeReport::empty();
        report.record(sample());
        let json = serde_json::to_string(&report).unwrap();
        let back: RetimeReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }
}
