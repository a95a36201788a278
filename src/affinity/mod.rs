//! Affinity: how closely each candidate resembles the already-won customers.
//!
//! A novelty model is learned from known customers only (imputer → scaler →
//! PCA → RBF one-class SVM with grid-searched hyperparameters), then every
//! non-excluded candidate is scored and the scores are rescaled to [0, 1].

mod eigen;
mod grid;
mod preprocess;
mod scorer;
mod svm;

pub use grid::{Gamma, GridScore, Hyperparams, default_grid};
pub use scorer::{AffinityDiagnostics, AffinityScorer, AffinityScores, DEFAULT_SEED};
