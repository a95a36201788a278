//! Mapping raw backend values back onto (candidate row, agent) pairs.

use crate::error::{OptimizationError, Result};
use crate::geom::DistanceMatrix;
use super::model::{AssignmentLayout, BinaryProgram};

/// Distance from {0, 1} a binary output may carry before it is rejected.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

fn failure(msg: String) -> crate::error::Error {
    OptimizationError::SolverFailure(msg).into()
}

/// Selected (row, agent) pairs of a binary solution, in variable order.
///
/// A value counts as selected when it exceeds 0.5; every value must lie within
/// `INTEGRALITY_TOLERANCE` of 0 or 1.
pub fn parse_selection(values: &[f64], layout: AssignmentLayout) -> Result<Vec<(usize, usize)>> {
    if values.len() != layout.num_vars() {
        return Err(failure(format!(
            "backend returned {} values for {} variables", values.len(), layout.num_vars()
        )));
    }

    let mut pairs = Vec::new();
    for (var, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(failure(format!("variable {var} has non-finite value {value}")));
        }
        if value.abs().min((1.0 - value).abs()) > INTEGRALITY_TOLERANCE {
            return Err(failure(format!("variable {var} has non-binary value {value}")));
        }
        if value > 0.5 { pairs.push(layout.pair(var)) }
    }
    Ok(pairs)
}

/// Give every unassigned row with a zero-cost agent to the first such agent.
///
/// Neither the objective nor any coverage floor gets worse, so the result stays
/// optimal while degenerate optima become deterministic.
pub fn complete_zero_travel(pairs: &mut Vec<(usize, usize)>, distances: &DistanceMatrix) -> usize {
    let mut assigned = vec![false; distances.num_rows()];
    for &(row, _) in pairs.iter() { assigned[row] = true }

    let mut added = 0;
    for row in 0..distances.num_rows() {
        if assigned[row] { continue }
        if let Some(agent) = (0..distances.num_agents()).find(|&a| distances.get(row, a) == 0.0) {
            pairs.push((row, agent));
            added += 1;
        }
    }
    pairs.sort_unstable();
    added
}

/// Re-check a parsed assignment against every constraint of the program.
pub fn validate_assignment(program: &BinaryProgram, layout: AssignmentLayout, pairs: &[(usize, usize)]) -> Result<()> {
    let mut values = vec![0.0; layout.num_vars()];
    for &(row, agent) in pairs {
        let var = layout.var(row, agent);
        if values[var] != 0.0 {
            return Err(failure(format!("pair (row {row}, agent {agent}) selected twice")));
        }
        values[var] = 1.0;
    }

    match program.constraints.iter().position(|c| !c.is_satisfied(&values, INTEGRALITY_TOLERANCE)) {
        Some(index) => Err(failure(format!("assignment violates constraint {index} of the model"))),
        None => Ok(()),
    }
}
