#![doc = "Fairshare public API: fair, travel-minimizing assignment of candidates to field agents"]
mod affinity;
mod config;
mod error;
mod geom;
mod io;
mod labels;
mod motivation;
mod plan;
mod solver;
mod types;

#[doc(inline)]
pub use error::{Error, OptimizationError, Result};

#[doc(inline)]
pub use types::{Agent, AgentId, AgentSet, Candidate, CandidateColumns, CandidateId, CandidateSet, Label, Location};

#[doc(inline)]
pub use labels::LabelSet;

#[doc(inline)]
pub use config::{MAX_TIMEOUT_SECONDS, RunConfig};

#[doc(inline)]
pub use geom::{DistanceMatrix, distance_km};

#[doc(inline)]
pub use affinity::{AffinityDiagnostics, AffinityScorer, AffinityScores, DEFAULT_SEED, Gamma, GridScore, Hyperparams, default_grid};

#[doc(inline)]
pub use motivation::Motivation;

#[doc(inline)]
pub use solver::{
    AssignmentLayout, AssignmentSolution, AssignmentSolver, BackendError, BinaryProgram, BranchAndBound,
    CancelToken, INTEGRALITY_TOLERANCE, LinearConstraint, MilpBackend, RawSolution, Sense, SolveDiagnostics,
    SolveLimits, SolveOptions, assignment_program, coverage_quota, relative_gap,
};

#[doc(inline)]
pub use plan::{AgentSummary, AssignmentRow, PlanReport, Planner};
