//! The assignment problem as a pure binary linear program.

use serde::Serialize;

use crate::geom::DistanceMatrix;

/// Direction of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    LessEq,
    GreaterEq,
}

/// Σ coefficient · x[var] (sense) rhs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy this constraint up to `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.terms.iter().map(|&(var, coef)| coef * values[var]).sum::<f64>();
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + tolerance,
            Sense::GreaterEq => lhs >= self.rhs - tolerance,
        }
    }
}

/// minimize Σ cost · x  subject to linear constraints, every x ∈ {0, 1}.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryProgram {
    pub costs: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    #[inline] pub fn num_vars(&self) -> usize { self.costs.len() }

    /// Objective value of an assignment of the variables.
    pub fn objective(&self, values: &[f64]) -> f64 {
        self.costs.iter().zip(values).map(|(c, v)| c * v).sum()
    }
}

/// Layout of the candidate × agent decision variables.
///
/// Variable `x[c][a]` lives at index `c * num_agents + a`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentLayout {
    pub num_rows: usize,
    pub num_agents: usize,
}

impl AssignmentLayout {
    #[inline] pub fn var(&self, row: usize, agent: usize) -> usize { row * self.num_agents + agent }

    /// (row, agent) pair of a variable index.
    #[inline] pub fn pair(&self, var: usize) -> (usize, usize) { (var / self.num_agents, var % self.num_agents) }

    #[inline] pub fn num_vars(&self) -> usize { self.num_rows * self.num_agents }
}

/// Per-agent motivation floor: coverage × (total motivation / agents).
#[inline]
pub fn coverage_quota(motivation: &[f64], num_agents: usize, coverage_fraction: f64) -> f64 {
    coverage_fraction * motivation.iter().sum::<f64>() / num_agents as f64
}

/// Build the fairness-constrained minimum-travel assignment program.
///
/// ```text
/// minimize   Σ_c Σ_a distance[c][a] · x[c][a]
/// subject to Σ_a x[c][a] ≤ 1                      for every candidate c
///            Σ_c motivation[c] · x[c][a] ≥ quota   for every agent a
/// ```
pub fn assignment_program(distances: &DistanceMatrix, motivation: &[f64], quota: f64) -> (BinaryProgram, AssignmentLayout) {
    let layout = AssignmentLayout { num_rows: distances.num_rows(), num_agents: distances.num_agents() };

    let costs = (0..layout.num_rows)
        .flat_map(|row| (0..layout.num_agents).map(move |agent| (row, agent)))
        .map(|(row, agent)| distances.get(row, agent))
        .collect();

    let at_most_one = (0..layout.num_rows).map(|row| LinearConstraint {
        terms: (0..layout.num_agents).map(|agent| (layout.var(row, agent), 1.0)).collect(),
        sense: Sense::LessEq,
        rhs: 1.0,
    });

    let coverage = (0..layout.num_agents).map(|agent| LinearConstraint {
        terms: (0..layout.num_rows)
            .filter(|&row| motivation[row] != 0.0)
            .map(|row| (layout.var(row, agent), motivation[row]))
            .collect(),
        sense: Sense::GreaterEq,
        rhs: quota,
    });

    let constraints = at_most_one.chain(coverage).collect();
    (BinaryProgram { costs, constraints }, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn layout_round_trips() {
        let layout = AssignmentLayout { num_rows: 4, num_agents: 3 };
        for row in 0..4 {
            for agent in 0..3 {
                assert_eq!(layout.pair(layout.var(row, agent)), (row, agent));
            }
        }
        assert_eq!(layout.num_vars(), 12);
    }

    #[test]
    fn builds_one_row_constraint_per_candidate_and_one_floor_per_agent() {
        let distances = DistanceMatrix::from_array(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let motivation = [10.0, 0.0, 30.0];
        let quota = coverage_quota(&motivation, 2, 0.5);
        assert_eq!(quota, 10.0);

        let (program, layout) = assignment_program(&distances, &motivation, quota);
        assert_eq!(program.costs, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(program.constraints.len(), 3 + 2);

        let floor = &program.constraints[3];
        assert_eq!(floor.sense, Sense::GreaterEq);
        assert_eq!(floor.terms, vec![(layout.var(0, 0), 10.0), (layout.var(2, 0), 30.0)]);
        assert_eq!(floor.rhs, 10.0);
    }

    #[test]
    fn constraint_satisfaction_and_objective() {
        let distances = DistanceMatrix::from_array(array![[1.0, 2.0], [3.0, 4.0]]);
        let (program, _) = assignment_program(&distances, &[5.0, 5.0], 5.0);

        let one_each = [1.0, 0.0, 0.0, 1.0];
        assert!(program.constraints.iter().all(|c| c.is_satisfied(&one_each, 1e-9)));
        assert_eq!(program.objective(&one_each), 5.0);

        let double = [1.0, 1.0, 0.0, 0.0];
        assert!(!program.constraints[0].is_satisfied(&double, 1e-9));
    }
}
