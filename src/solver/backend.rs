use std::{
    sync::{Arc, atomic::{AtomicBool, Ordering}},
    time::{Duration, Instant},
};

use thiserror::Error;

use super::model::BinaryProgram;

/// Shared flag a caller flips to abort a running solve.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[inline] pub fn new() -> Self { Self::default() }

    /// Request cancellation; every clone observes it.
    #[inline] pub fn cancel(&self) { self.0.store(true, Ordering::SeqCst) }

    #[inline] pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// Limits a backend must honour.
#[derive(Debug, Clone)]
pub struct SolveLimits {
    /// Acceptable relative optimality gap, in [0, 1).
    pub relative_gap: f64,
    /// Wall-clock budget of the solve.
    pub timeout: Duration,
    /// Absolute point in time the budget runs out; `None` when it lies beyond what `Instant` can hold.
    pub deadline: Option<Instant>,
    pub cancel: CancelToken,
}

impl SolveLimits {
    /// Limits starting now.
    pub fn starting_now(relative_gap: f64, timeout: Duration, cancel: CancelToken) -> Self {
        Self { relative_gap, timeout, deadline: Instant::now().checked_add(timeout), cancel }
    }

    #[inline] pub fn is_expired(&self) -> bool { self.deadline.is_some_and(|d| Instant::now() >= d) }
}

/// Raw backend answer, before it is mapped back onto candidates and agents.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSolution {
    /// Value of every variable, in program order (may carry numerical noise).
    pub values: Vec<f64>,
    /// Objective value of `values`.
    pub objective: f64,
    /// Proven lower bound on the optimal objective.
    pub best_bound: f64,
    /// Search nodes explored, when the backend reports it.
    pub nodes: usize,
    /// The deadline cut the search short; `best_bound` is then the best proven so far.
    pub timed_out: bool,
}

/// Backend-level failure; the assignment layer adds problem context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("problem is infeasible")]
    Infeasible,
    #[error("time limit reached without a feasible solution")]
    Timeout,
    #[error("cancelled")]
    Cancelled,
    #[error("{0}")]
    Failure(String),
}

/// A mixed-integer solver able to handle pure binary programs.
///
/// Implementations must return within (roughly) the deadline in `limits`, must
/// stop promptly once `limits.cancel` is set, and must release everything they
/// allocated on every return path. A returned solution only has to be within the
/// requested gap when `best_bound` says so; callers report the achieved gap.
pub trait MilpBackend: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &str;

    fn solve(&self, program: &BinaryProgram, limits: &SolveLimits) -> Result<RawSolution, BackendError>;
}

/// Relative gap between an incumbent objective and a lower bound.
pub fn relative_gap(objective: f64, bound: f64) -> f64 {
    if objective <= bound { return 0.0 }
    (objective - bound) / objective.abs().max(1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn gap_is_relative_to_incumbent() {
        assert_eq!(relative_gap(100.0, 98.0), 0.02);
        assert_eq!(relative_gap(0.0, 0.0), 0.0);
        assert_eq!(relative_gap(10.0, 12.0), 0.0);
    }

    #[test]
    fn zero_timeout_is_already_expired() {
        let limits = SolveLimits::starting_now(0.0, Duration::ZERO, CancelToken::new());
        assert!(limits.is_expired());
    }

    #[test]
    fn unrepresentable_deadline_never_expires() {
        let limits = SolveLimits::starting_now(0.0, Duration::MAX, CancelToken::new());
        assert_eq!(limits.deadline, None);
        assert!(!limits.is_expired());
    }
}
