//! Fairness-constrained minimum-travel assignment.
//!
//! `model` turns distances and motivation into a binary program, a
//! [`MilpBackend`] solves it, and `parse` maps the answer back onto
//! (candidate, agent) pairs and re-checks it. [`AssignmentSolver`] ties the
//! three together and reports how close to optimal the result is.

mod assign;
mod backend;
mod branch;
mod model;
mod parse;

pub use assign::{AssignmentSolution, AssignmentSolver, SolveDiagnostics, SolveOptions};
pub use backend::{BackendError, CancelToken, MilpBackend, RawSolution, SolveLimits, relative_gap};
pub use branch::BranchAndBound;
pub use model::{AssignmentLayout, BinaryProgram, LinearConstraint, Sense, assignment_program, coverage_quota};
pub use parse::INTEGRALITY_TOLERANCE;
