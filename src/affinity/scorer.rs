use ndarray::{Array1, ArrayView2};
use serde::Serialize;

use crate::error::{Error, Result, input_bail};
use crate::types::{CandidateId, CandidateSet, Label};
use super::{
    grid::{self, GridScore, Hyperparams},
    preprocess::{EXPLAINED_VARIANCE, Preprocessor},
    svm::OneClassSvm,
};

/// Seed of the known-customer split unless the caller picks another.
pub const DEFAULT_SEED: u64 = 2025;

/// Learns the known-customer profile and scores candidates against it.
#[derive(Debug, Clone)]
pub struct AffinityScorer {
    seed: u64,
    grid: Vec<Hyperparams>,
    explained_variance: f64,
}

/// What the scorer chose and why.
#[derive(Debug, Clone, Serialize)]
pub struct AffinityDiagnostics {
    pub selected: Hyperparams,
    pub grid: Vec<GridScore>,
    pub features_used: usize,
    pub components: usize,
    /// Share of the customer variance each retained principal component explains.
    pub explained_variance_ratio: Vec<f64>,
    pub support_vectors: usize,
}

/// Affinity in [0, 1] for every scored candidate, keyed by candidate-set index.
#[derive(Debug, Clone)]
pub struct AffinityScores {
    rows: Vec<usize>,
    scores: Vec<f64>,
    diagnostics: Option<AffinityDiagnostics>,
}

impl Default for AffinityScorer {
    fn default() -> Self { Self::new(DEFAULT_SEED) }
}

impl AffinityScorer {
    /// Scorer with the canonical grid and a 95% explained-variance PCA.
    pub fn new(seed: u64) -> Self {
        Self { seed, grid: grid::default_grid(), explained_variance: EXPLAINED_VARIANCE }
    }

    /// Replace the search grid (order matters: earlier points win ties).
    pub fn with_grid(mut self, grid: Vec<Hyperparams>) -> Self {
        self.grid = grid;
        self
    }

    #[inline] pub fn seed(&self) -> u64 { self.seed }

    /// Score every non-excluded candidate (known customers and unknowns).
    ///
    /// Fails with `Error::Input` when there are no known customers to learn from.
    pub fn score(&self, candidates: &CandidateSet) -> Result<AffinityScores> {
        let rows = candidates.scoring_indices();
        let known_rows = rows.iter().copied()
            .filter(|&i| candidates.candidate(i).label == Label::Customer)
            .collect::<Vec<_>>();
        if known_rows.is_empty() { input_bail!("no known-customer rows to fit affinity against") }

        tracing::info!(
            known = known_rows.len(), scored = rows.len(), features = candidates.feature_names().len(),
            seed = self.seed, "[affinity] fitting known-customer profile"
        );

        let known = candidates.feature_matrix(&known_rows);
        let all = candidates.feature_matrix(&rows);
        let (scores, diagnostics) = self.score_matrix(known.view(), all.view())?;

        Ok(AffinityScores { rows, scores: scores.to_vec(), diagnostics: Some(diagnostics) })
    }

    /// Core pipeline on raw feature matrices: fit on `known`, score every row of `all`.
    pub fn score_matrix(&self, known: ArrayView2<f64>, all: ArrayView2<f64>) -> Result<(Array1<f64>, AffinityDiagnostics)> {
        if known.nrows() == 0 { input_bail!("no known-customer rows to fit affinity against") }
        if known.ncols() != all.ncols() {
            input_bail!("known rows have {} features but scored rows have {}", known.ncols(), all.ncols());
        }

        let preprocessor = Preprocessor::fit(known, self.explained_variance)?;
        let known_proc = preprocessor.transform(known);
        let all_proc = preprocessor.transform(all);

        let (selected, grid) = grid::select(known_proc.view(), &self.grid, self.seed)?;
        tracing::info!(params = %selected, "[affinity] selected hyperparameters");

        let svm = OneClassSvm { nu: selected.nu, gamma: selected.gamma.resolve(known_proc.view()) };
        let model = svm.fit(known_proc.view())?;
        let raw = model.decision_function(all_proc.view());

        if raw.iter().any(|v| !v.is_finite()) {
            return Err(Error::input("affinity model produced a non-finite decision value"));
        }

        let diagnostics = AffinityDiagnostics {
            selected,
            grid,
            features_used: preprocessor.num_features(),
            components: preprocessor.num_components(),
            explained_variance_ratio: preprocessor.explained_ratio().to_vec(),
            support_vectors: model.num_support(),
        };

        Ok((min_max_scale(&raw), diagnostics))
    }

    /// Scoring disabled: every eligible candidate gets exactly 1.0.
    pub fn uniform(candidates: &CandidateSet) -> AffinityScores {
        let rows = candidates.eligible_indices();
        let scores = vec![1.0; rows.len()];
        AffinityScores { rows, scores, diagnostics: None }
    }
}

/// (x − min) / (max − min); all zeros when every value is equal.
fn min_max_scale(values: &Array1<f64>) -> Array1<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || max == min {
        Array1::zeros(values.len())
    } else {
        values.mapv(|v| (v - min) / (max - min))
    }
}

impl AffinityScores {
    /// Score of the candidate at candidate-set index `index`, if it was scored.
    pub fn at(&self, index: usize) -> Option<f64> {
        self.rows.binary_search(&index).ok().map(|pos| self.scores[pos])
    }

    /// Score of a candidate by id.
    pub fn get(&self, candidates: &CandidateSet, id: &CandidateId) -> Option<f64> {
        let position = candidates.candidates().iter().position(|c| &c.id == id)?;
        self.at(position)
    }

    /// (candidate-set index, score) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.rows.iter().copied().zip(self.scores.iter().copied())
    }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Selection details, absent when scoring was disabled.
    #[inline] pub fn diagnostics(&self) -> Option<&AffinityDiagnostics> { self.diagnostics.as_ref() }
}
