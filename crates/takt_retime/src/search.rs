//! The retiming search: smallest feasible clock period and its lag vector.
//!
//! Feasibility of one candidate period is decided by bounded relaxation
//! ([`attempt_retiming`]): any node whose combinational delay exceeds the
//! budget gets a register pulled backward across it, and the delays are
//! recomputed. If a legal retiming meeting the budget exists, `|V| - 1`
//! rounds reach one. Feasibility is monotonic in the period, so a binary
//! search over the sorted candidate set finds the optimum.

use crate::candidates::candidate_periods;
use crate::combinational::{clock_period, combinational_delays};
use crate::error::RetimeError;
use crate::graph::{CircuitGraph, Retiming};
use crate::ids::GraphNodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use takt_common::InternalError;

/// The result of a successful retiming search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetimingSolution {
    /// The smallest feasible clock period.
    pub period: u64,
    /// A legal retiming achieving that period.
    pub retiming: Retiming,
}

/// Attempts to find a legal retiming with clock period at most `period`.
///
/// Starts from the identity and runs up to `|V| - 1` correction rounds:
/// each round recomputes combinational delays under the current lags and
/// increments the lag of every node over budget. A round that changes
/// nothing has converged. Returns `None` if the resulting period still
/// exceeds the budget (the candidate is infeasible).
pub fn attempt_retiming(
    graph: &CircuitGraph,
    period: u64,
) -> Result<Option<Retiming>, RetimeError> {
    let mut retiming = Retiming::identity(graph);
    let n = graph.node_count();

    for _ in 1..n {
        let delays = combinational_delays(graph, &retiming)?;
        let mut changed = false;
        for (index, &delay) in delays.iter().enumerate() {
            if delay > period {
                retiming.increment(GraphNodeId::from_raw(index as u32));
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    if clock_period(graph, &retiming)? <= period {
        Ok(Some(retiming))
    } else {
        Ok(None)
    }
}

/// Finds the smallest feasible clock period and a retiming achieving it.
///
/// Enumerates the candidate periods, then binary-searches them for the
/// feasibility threshold, caching attempts per period. The unretimed clock
/// period is always among the candidates and always feasible, so an empty
/// or fully infeasible search is an engine defect, not a user error.
pub fn minimize_clock_period(graph: &CircuitGraph) -> Result<RetimingSolution, RetimeError> {
    if graph.node_count() == 0 {
        return Ok(RetimingSolution {
            period: 0,
            retiming: Retiming::identity(graph),
        });
    }

    let candidates = candidate_periods(graph);
    if candidates.is_empty() {
        return Err(InternalError::new(
            "candidate clock period set is empty for a non-empty graph",
        )
        .into());
    }

    let mut attempts: HashMap<u64, Option<Retiming>> = HashMap::new();
    let mut best: Option<RetimingSolution> = None;
    let mut lo = 0usize;
    let mut hi = candidates.len() - 1;

    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let period = candidates[mid];
        let attempt = match attempts.get(&period) {
            Some(cached) => cached.clone(),
            None => {
                let fresh = attempt_retiming(graph, period)?;
                attempts.insert(period, fresh.clone());
                fresh
            }
        };
        match attempt {
            Some(retiming) => {
                best = Some(RetimingSolution { period, retiming });
                if mid == 0 {
                    break;
                }
                hi = mid - 1;
            }
            None => lo = mid + 1,
        }
    }

    best.ok_or_else(|| {
        InternalError::new(
            "no candidate clock period is feasible; the unretimed period always is",
        )
        .into()
    })
}
