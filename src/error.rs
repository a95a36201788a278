use thiserror::Error;

/// Result alias for the scoring, distance and assignment core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the core. Edges (file loading, CLI) wrap these in `anyhow`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Structurally unusable input: missing columns, empty sets, nothing to fit against.
    #[error("input error: {0}")]
    Input(String),

    /// Well-formed input carrying out-of-range values.
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Optimization(#[from] OptimizationError),
}

/// Failures of the constrained assignment solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizationError {
    /// No integral assignment satisfies the coverage floor of every agent.
    #[error(
        "infeasible: coverage_fraction={coverage_fraction} over {num_agents} agents requires \
         {quota:.2} motivation per agent (total motivation {total_motivation:.2}), \
         which no assignment can provide"
    )]
    Infeasible {
        coverage_fraction: f64,
        num_agents: usize,
        quota: f64,
        total_motivation: f64,
    },

    /// The deadline passed before any integral feasible solution was found.
    #[error("timeout: no feasible assignment found within {seconds}s")]
    Timeout { seconds: f64 },

    #[error("solve cancelled")]
    Cancelled,

    /// Technical failure of the backend (numerical trouble, malformed output).
    #[error("solver failure: {0}")]
    SolverFailure(String),
}

impl OptimizationError {
    /// True when the caller can act on the error by relaxing the coverage fraction.
    #[inline] pub fn is_infeasible(&self) -> bool { matches!(self, Self::Infeasible { .. }) }
}

impl Error {
    pub(crate) fn input(msg: impl Into<String>) -> Self { Self::Input(msg.into()) }

    pub(crate) fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

/// Bail out of a core function with an `Error::Input`.
macro_rules! input_bail {
    ($($arg:tt)*) => { return Err($crate::error::Error::input(format!($($arg)*))) };
}

/// Bail out of a core function with an `Error::Validation` unless `cond` holds.
macro_rules! validate {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond { return Err($crate::error::Error::validation(format!($($arg)*))) }
    };
}

pub(crate) use {input_bail, validate};
