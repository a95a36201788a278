//! Depth-first branch and bound over LP relaxations solved with `good_lp`.
//!
//! Each node fixes a subset of the binaries. Fixed variables are folded into the
//! constants of the relaxation, so a node's LP only carries its free variables.
//! Branching picks the most fractional free variable and explores the up-branch
//! first, which reaches a feasible incumbent quickly on covering constraints.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, default_solver, variable,
};

use super::{
    backend::{BackendError, MilpBackend, RawSolution, SolveLimits, relative_gap},
    model::{BinaryProgram, Sense},
};

/// Values within this distance of 0 or 1 count as integral.
const INTEGRAL_EPS: f64 = 1e-6;

/// Slack used when comparing objective values.
const OBJECTIVE_EPS: f64 = 1e-9;

/// The built-in backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBound;

struct Node {
    fixed: Vec<Option<bool>>,
    /// LP objective of the parent; a lower bound for everything below this node.
    bound: f64,
}

struct Incumbent {
    values: Vec<f64>,
    objective: f64,
}

impl MilpBackend for BranchAndBound {
    fn name(&self) -> &str { "branch-and-bound" }

    fn solve(&self, program: &BinaryProgram, limits: &SolveLimits) -> Result<RawSolution, BackendError> {
        let mut stack = vec![Node { fixed: vec![None; program.num_vars()], bound: f64::NEG_INFINITY }];
        let mut incumbent: Option<Incumbent> = None;
        let mut pruned_bound = f64::INFINITY;
        let mut nodes = 0usize;

        while let Some(node) = stack.pop() {
            if limits.cancel.is_cancelled() {
                tracing::info!(nodes, "[solver::branch] cancelled");
                return Err(BackendError::Cancelled);
            }

            if limits.is_expired() {
                let Some(best) = incumbent else { return Err(BackendError::Timeout) };
                let open = stack.iter().map(|n| n.bound).fold(node.bound, f64::min);
                let best_bound = open.min(pruned_bound).min(best.objective);
                tracing::warn!(
                    nodes, incumbent = best.objective, bound = best_bound,
                    gap = relative_gap(best.objective, best_bound),
                    "[solver::branch] deadline reached, returning incumbent"
                );
                return Ok(RawSolution { values: best.values, objective: best.objective, best_bound, nodes, timed_out: true });
            }

            if let Some(best) = &incumbent {
                if node.bound >= best.objective - OBJECTIVE_EPS { continue }
                if relative_gap(best.objective, node.bound) <= limits.relative_gap {
                    pruned_bound = pruned_bound.min(node.bound);
                    continue;
                }
            }

            let Some((values, objective)) = relax(program, &node.fixed)? else { continue };
            nodes += 1;

            if let Some(best) = &incumbent {
                if objective >= best.objective - OBJECTIVE_EPS { continue }
                if relative_gap(best.objective, objective) <= limits.relative_gap {
                    pruned_bound = pruned_bound.min(objective);
                    continue;
                }
            }

            match most_fractional(&values) {
                None => {
                    let values = values.iter().map(|v| v.round()).collect::<Vec<_>>();
                    let objective = program.objective(&values);
                    tracing::debug!(nodes, incumbent = objective, "[solver::branch] new incumbent");
                    incumbent = Some(Incumbent { values, objective });
                }
                Some(var) => {
                    let mut down = node.fixed.clone();
                    down[var] = Some(false);
                    let mut up = node.fixed;
                    up[var] = Some(true);
                    stack.push(Node { fixed: down, bound: objective });
                    stack.push(Node { fixed: up, bound: objective });
                }
            }

            if nodes % 1000 == 0 {
                tracing::debug!(
                    nodes, open = stack.len(), incumbent = incumbent.as_ref().map(|i| i.objective),
                    "[solver::branch] progress"
                );
            }
        }

        let Some(best) = incumbent else {
            tracing::info!(nodes, "[solver::branch] search tree exhausted without a feasible point");
            return Err(BackendError::Infeasible);
        };

        let best_bound = pruned_bound.min(best.objective);
        tracing::debug!(nodes, objective = best.objective, bound = best_bound, "[solver::branch] finished");
        Ok(RawSolution { values: best.values, objective: best.objective, best_bound, nodes, timed_out: false })
    }
}

/// Index of the free variable whose value is closest to 0.5, lowest index on ties.
fn most_fractional(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (var, &value) in values.iter().enumerate() {
        let distance = value.min(1.0 - value);
        if distance <= INTEGRAL_EPS { continue }
        if best.is_none_or(|(_, d)| distance > d) { best = Some((var, distance)) }
    }
    best.map(|(var, _)| var)
}

/// Solve the LP relaxation of `program` under the fixings in `fixed`.
///
/// Returns the full value vector (fixed variables included) and its objective,
/// or `None` when the node is infeasible.
fn relax(program: &BinaryProgram, fixed: &[Option<bool>]) -> Result<Option<(Vec<f64>, f64)>, BackendError> {
    let fixed_value = |var: usize| fixed[var].map(|b| if b { 1.0 } else { 0.0 });

    let mut vars = ProblemVariables::new();
    let lp_vars = fixed.iter()
        .map(|f| f.is_none().then(|| vars.add(variable().min(0.0).max(1.0))))
        .collect::<Vec<Option<Variable>>>();

    // Constraint rows with fixed terms moved to the right-hand side.
    let mut rows = Vec::with_capacity(program.constraints.len());
    for c in &program.constraints {
        let mut lhs = Expression::from(0.0);
        let mut free_terms = 0usize;
        let mut rhs = c.rhs;
        for &(var, coef) in &c.terms {
            match lp_vars[var] {
                Some(v) => { lhs += coef * v; free_terms += 1; }
                None => rhs -= coef * fixed_value(var).unwrap_or(0.0),
            }
        }

        if free_terms == 0 {
            let holds = match c.sense {
                Sense::LessEq => 0.0 <= rhs + INTEGRAL_EPS,
                Sense::GreaterEq => 0.0 >= rhs - INTEGRAL_EPS,
            };
            if !holds { return Ok(None) }
            continue;
        }

        rows.push(match c.sense {
            Sense::LessEq => constraint!(lhs <= rhs),
            Sense::GreaterEq => constraint!(lhs >= rhs),
        });
    }

    if lp_vars.iter().all(Option::is_none) {
        let values = (0..fixed.len()).map(|var| fixed_value(var).unwrap_or(0.0)).collect::<Vec<_>>();
        let objective = program.objective(&values);
        return Ok(Some((values, objective)));
    }

    let objective = program.costs.iter().zip(&lp_vars)
        .filter_map(|(&cost, v)| v.map(|v| cost * v))
        .fold(Expression::from(0.0), |acc, term| acc + term);

    let mut problem = vars.minimise(objective).using(default_solver);
    for row in rows {
        problem = problem.with(row);
    }

    let solution = match problem.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => return Ok(None),
        Err(err) => return Err(BackendError::Failure(format!("LP relaxation failed: {err}"))),
    };

    let values = lp_vars.iter().enumerate()
        .map(|(var, v)| match v {
            Some(v) => solution.value(*v).clamp(0.0, 1.0),
            None => fixed_value(var).unwrap_or(0.0),
        })
        .collect::<Vec<_>>();

    if values.iter().any(|v| !v.is_finite()) {
        return Err(BackendError::Failure("LP relaxation returned a non-finite value".into()));
    }

    let objective = program.objective(&values);
    Ok(Some((values, objective)))
}
