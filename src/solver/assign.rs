use std::{sync::Arc, time::{Duration, Instant}};

use serde::Serialize;

use crate::error::{Error, OptimizationError, Result, input_bail, validate};
use crate::geom::DistanceMatrix;
use super::{
    backend::{BackendError, CancelToken, MilpBackend, SolveLimits, relative_gap},
    branch::BranchAndBound,
    model::{assignment_program, coverage_quota},
    parse::{complete_zero_travel, parse_selection, validate_assignment},
};

/// Gap and time budget of a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Relative optimality gap at which the search may stop, in [0, 1).
    pub relative_gap: f64,
    pub timeout: Duration,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { relative_gap: 0.02, timeout: Duration::from_secs(60) }
    }
}

/// Quality and cost of a returned assignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveDiagnostics {
    pub backend: String,
    /// Total travel (km) of the returned assignment.
    pub total_cost: f64,
    /// Relative gap between the returned objective and the proven bound.
    pub achieved_gap: f64,
    pub is_within_gap: bool,
    /// The time limit cut the search short.
    pub timed_out: bool,
    pub solve_time_ms: u64,
    pub nodes: usize,
    /// Motivation floor every agent had to reach.
    pub quota: f64,
    pub total_motivation: f64,
}

/// A validated assignment: (row, agent) pairs sorted by row.
///
/// Rows index the distance matrix and motivation vector handed to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSolution {
    pub pairs: Vec<(usize, usize)>,
    pub diagnostics: SolveDiagnostics,
}

impl AssignmentSolution {
    /// Motivation assigned to each agent.
    pub fn motivation_per_agent(&self, motivation: &[f64], num_agents: usize) -> Vec<f64> {
        let mut totals = vec![0.0; num_agents];
        for &(row, agent) in &self.pairs { totals[agent] += motivation[row] }
        totals
    }
}

/// Fairness-constrained minimum-travel assignment.
#[derive(Clone)]
pub struct AssignmentSolver {
    options: SolveOptions,
    backend: Arc<dyn MilpBackend>,
}

impl AssignmentSolver {
    /// Solver using the built-in branch-and-bound backend.
    pub fn new(options: SolveOptions) -> Self {
        Self::with_backend(options, Arc::new(BranchAndBound))
    }

    pub fn with_backend(options: SolveOptions, backend: Arc<dyn MilpBackend>) -> Self {
        Self { options, backend }
    }

    #[inline] pub fn options(&self) -> SolveOptions { self.options }

    #[inline] pub fn backend_name(&self) -> &str { self.backend.name() }

    /// Assign rows of `distances` to its agents so that every agent reaches
    /// `coverage_fraction` of the average motivation, at least total travel.
    pub fn solve(&self, distances: &DistanceMatrix, motivation: &[f64], coverage_fraction: f64, cancel: &CancelToken) -> Result<AssignmentSolution> {
        let (num_rows, num_agents) = (distances.num_rows(), distances.num_agents());
        if num_rows == 0 { input_bail!("no eligible candidates to assign") }
        if num_agents == 0 { input_bail!("no agents to assign candidates to") }
        if motivation.len() != num_rows {
            input_bail!("motivation has {} entries but the distance matrix has {num_rows} rows", motivation.len());
        }

        validate!(coverage_fraction > 0.0 && coverage_fraction < 1.0,
            "coverage_fraction must lie in (0, 1) (got {coverage_fraction})");
        validate!((0.0..1.0).contains(&self.options.relative_gap),
            "optimality gap must lie in [0, 1) (got {})", self.options.relative_gap);
        validate!(!self.options.timeout.is_zero(), "solver timeout must be positive");
        if let Some(row) = motivation.iter().position(|m| !m.is_finite() || *m < 0.0) {
            return Err(Error::validation(format!(
                "motivation of row {row} must be finite and non-negative (got {})", motivation[row]
            )));
        }

        if let Some(((row, agent), km)) = distances.as_array().indexed_iter().find(|(_, km)| !km.is_finite() || **km < 0.0) {
            return Err(Error::validation(format!(
                "distance from row {row} to agent {agent} must be finite and non-negative (got {km})"
            )));
        }

        let total_motivation = motivation.iter().sum::<f64>();
        let quota = coverage_quota(motivation, num_agents, coverage_fraction);
        let (program, layout) = assignment_program(distances, motivation, quota);

        tracing::info!(
            candidates = num_rows, agents = num_agents, variables = program.num_vars(),
            quota, backend = self.backend.name(), "[solver] solving assignment"
        );

        let limits = SolveLimits::starting_now(self.options.relative_gap, self.options.timeout, cancel.clone());
        let started = Instant::now();
        let raw = self.backend.solve(&program, &limits).map_err(|err| match err {
            BackendError::Infeasible => OptimizationError::Infeasible {
                coverage_fraction, num_agents, quota, total_motivation,
            },
            BackendError::Timeout => OptimizationError::Timeout { seconds: self.options.timeout.as_secs_f64() },
            BackendError::Cancelled => OptimizationError::Cancelled,
            BackendError::Failure(msg) => OptimizationError::SolverFailure(format!("{}: {msg}", self.backend.name())),
        })?;
        let solve_time_ms = started.elapsed().as_millis() as u64;

        let mut pairs = parse_selection(&raw.values, layout)?;
        let completed = complete_zero_travel(&mut pairs, distances);
        validate_assignment(&program, layout, &pairs)?;

        let total_cost = pairs.iter().map(|&(row, agent)| distances.get(row, agent)).sum::<f64>();
        let achieved_gap = relative_gap(total_cost, raw.best_bound.min(total_cost));
        let is_within_gap = achieved_gap <= self.options.relative_gap;

        if raw.timed_out && !is_within_gap {
            tracing::warn!(achieved_gap, requested = self.options.relative_gap, "[solver] timed out above the requested gap");
        }
        tracing::info!(
            assigned = pairs.len(), zero_travel_added = completed, total_cost, achieved_gap,
            solve_time_ms, nodes = raw.nodes, "[solver] assignment solved"
        );

        Ok(AssignmentSolution {
            pairs,
            diagnostics: SolveDiagnostics {
                backend: self.backend.name().to_string(),
                total_cost,
                achieved_gap,
                is_within_gap,
                timed_out: raw.timed_out,
                solve_time_ms,
                nodes: raw.nodes,
                quota,
                total_motivation,
            },
        })
    }
}
