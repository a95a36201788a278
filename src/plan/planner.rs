use std::sync::Arc;

use crate::affinity::{AffinityScorer, AffinityScores};
use crate::config::RunConfig;
use crate::error::{Result, input_bail};
use crate::geom::DistanceMatrix;
use crate::motivation::Motivation;
use crate::solver::{AssignmentSolver, CancelToken, MilpBackend};
use crate::types::{AgentSet, CandidateSet, Label};
use super::report::PlanReport;

/// Runs the whole pipeline: scoring, motivation, distances, solve, assembly.
#[derive(Clone)]
pub struct Planner {
    config: RunConfig,
    solver: AssignmentSolver,
}

impl Planner {
    /// Planner with the built-in solver backend. Fails on an invalid config.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let solver = AssignmentSolver::new(config.solve_options());
        Ok(Self { config, solver })
    }

    /// Planner solving with a caller-provided backend.
    pub fn with_backend(config: RunConfig, backend: Arc<dyn MilpBackend>) -> Result<Self> {
        config.validate()?;
        let solver = AssignmentSolver::with_backend(config.solve_options(), backend);
        Ok(Self { config, solver })
    }

    #[inline] pub fn config(&self) -> &RunConfig { &self.config }

    /// Affinity of every candidate the run scores, or uniform 1.0 when scoring is off.
    pub fn score(&self, candidates: &CandidateSet) -> Result<AffinityScores> {
        if self.config.use_affinity_scoring {
            AffinityScorer::new(self.config.seed).score(candidates)
        } else {
            Ok(AffinityScorer::uniform(candidates))
        }
    }

    /// Assign the unknown candidates of `candidates` to `agents`.
    pub fn run(&self, candidates: &CandidateSet, agents: &AgentSet, cancel: &CancelToken) -> Result<PlanReport> {
        let eligible = candidates.eligible_indices().len();
        tracing::info!(
            candidates = candidates.len(),
            customers = candidates.customer_count(),
            excluded = candidates.candidates().iter().filter(|c| c.label == Label::Excluded).count(),
            eligible,
            agents = agents.len(),
            label = %self.config.run_label(),
            "[plan] starting run"
        );
        if eligible == 0 { input_bail!("no unknown-label candidates are eligible for assignment") }

        let affinity = self.score(candidates)?;
        let motivation = Motivation::compute(candidates, &affinity)?;
        tracing::info!(total = motivation.total(), "[plan] motivation computed");

        let distances = DistanceMatrix::compute(candidates, motivation.rows(), agents, self.config.round_distances)?;
        let solution = self.solver.solve(&distances, motivation.values(), self.config.coverage_fraction, cancel)?;

        Ok(PlanReport::assemble(
            self.config.run_label(), candidates, agents, &affinity, &motivation, &distances, &solution,
        ))
    }
}
