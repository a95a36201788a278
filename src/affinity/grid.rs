//! Hyperparameter selection for the one-class model.
//!
//! Known customers are split (seeded) into two halves; each grid point is
//! trained on one half and scored on the other, both ways round, and its fitness
//! is the better of the two mean held-out decision values. Grid points are
//! evaluated in parallel and reduced in canonical grid order, so the earliest
//! point wins ties and the result does not depend on scheduling.

use std::fmt;

use ndarray::{Array2, ArrayView2, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use super::svm::OneClassSvm;

/// Kernel bandwidth setting, resolved against the training matrix at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gamma {
    /// 1 / (n_features · Var(X)), or 1 when X has zero variance.
    Scale,
    /// 1 / n_features.
    Auto,
    Value(f64),
}

impl Gamma {
    /// Resolve to a numeric bandwidth for training matrix `x`.
    pub(crate) fn resolve(&self, x: ArrayView2<f64>) -> f64 {
        let features = x.ncols().max(1) as f64;
        match *self {
            Gamma::Scale => {
                let variance = x.var(0.0);
                if variance > 0.0 && variance.is_finite() { 1.0 / (features * variance) } else { 1.0 }
            }
            Gamma::Auto => 1.0 / features,
            Gamma::Value(gamma) => gamma,
        }
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gamma::Scale => write!(f, "scale"),
            Gamma::Auto => write!(f, "auto"),
            Gamma::Value(gamma) => write!(f, "{gamma}"),
        }
    }
}

/// One point of the search grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hyperparams {
    pub gamma: Gamma,
    pub nu: f64,
}

impl fmt::Display for Hyperparams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gamma={} nu={}", self.gamma, self.nu)
    }
}

/// The canonical search grid: bandwidth in the outer loop, outlier fraction in the inner.
pub fn default_grid() -> Vec<Hyperparams> {
    const GAMMAS: [Gamma; 4] = [Gamma::Scale, Gamma::Auto, Gamma::Value(0.01), Gamma::Value(0.001)];
    const NUS: [f64; 4] = [0.01, 0.03, 0.05, 0.1];

    GAMMAS.iter()
        .flat_map(|&gamma| NUS.iter().map(move |&nu| Hyperparams { gamma, nu }))
        .collect()
}

/// Fitness of one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridScore {
    pub params: Hyperparams,
    pub fitness: f64,
}

/// Seeded split of `n` rows into two non-empty halves.
///
/// With a single row both halves are that row.
pub(crate) fn split_halves(n: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
    if n <= 1 { return (vec![0; n], vec![0; n]) }

    let mut order = (0..n).collect::<Vec<_>>();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let mid = (n / 2).clamp(1, n - 1);
    let (a, b) = order.split_at(mid);
    (a.to_vec(), b.to_vec())
}

/// Evaluate every grid point on the seeded halves of `known` and pick the best.
///
/// Returns the winning point and the per-point fitness in grid order.
pub(crate) fn select(known: ArrayView2<f64>, grid: &[Hyperparams], seed: u64) -> Result<(Hyperparams, Vec<GridScore>)> {
    if grid.is_empty() { return Err(Error::input("hyperparameter grid is empty")) }

    let (a_rows, b_rows) = split_halves(known.nrows(), seed);
    let a = known.select(Axis(0), &a_rows);
    let b = known.select(Axis(0), &b_rows);

    let scores = grid.par_iter()
        .map(|&params| Ok(GridScore { params, fitness: fitness(&a, &b, params)? }))
        .collect::<Result<Vec<_>>>()?;

    let mut best: Option<GridScore> = None;
    for score in &scores {
        tracing::debug!(params = %score.params, fitness = score.fitness, "[affinity::grid] evaluated");
        if !score.fitness.is_finite() { continue }
        if best.is_none_or(|b| score.fitness > b.fitness) { best = Some(*score) }
    }

    let best = best.ok_or_else(|| Error::input("no hyperparameter combination produced a finite fitness"))?;
    Ok((best.params, scores))
}

/// Max of the two cross-half mean decision values.
fn fitness(a: &Array2<f64>, b: &Array2<f64>, params: Hyperparams) -> Result<f64> {
    let held_out_mean = |train: &Array2<f64>, test: &Array2<f64>| -> Result<f64> {
        let svm = OneClassSvm { nu: params.nu, gamma: params.gamma.resolve(train.view()) };
        let scores = svm.fit(train.view())?.decision_function(test.view());
        Ok(scores.mean().unwrap_or(f64::NAN))
    };

    Ok(held_out_mean(a, b)?.max(held_out_mean(b, a)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn grid_order_is_gamma_major() {
        let grid = default_grid();
        assert_eq!(grid.len(), 16);
        assert_eq!(grid[0], Hyperparams { gamma: Gamma::Scale, nu: 0.01 });
        assert_eq!(grid[1], Hyperparams { gamma: Gamma::Scale, nu: 0.03 });
        assert_eq!(grid[4], Hyperparams { gamma: Gamma::Auto, nu: 0.01 });
        assert_eq!(grid[15], Hyperparams { gamma: Gamma::Value(0.001), nu: 0.1 });
    }

    #[test]
    fn halves_are_non_empty_and_disjoint() {
        for n in 2..12 {
            let (a, b) = split_halves(n, 2025);
            assert!(!a.is_empty() && !b.is_empty());
            assert_eq!(a.len() + b.len(), n);
            assert!(a.iter().all(|i| !b.contains(i)));
        }
    }

    #[test]
    fn single_row_split_reuses_the_row() {
        assert_eq!(split_halves(1, 7), (vec![0], vec![0]));
    }

    #[test]
    fn split_depends_only_on_seed() {
        assert_eq!(split_halves(20, 2025), split_halves(20, 2025));
    }

    #[test]
    fn gamma_resolution() {
        let x = array![[0.0, 0.0], [2.0, 2.0]];
        // Var over all entries = 1.
        assert_eq!(Gamma::Scale.resolve(x.view()), 0.5);
        assert_eq!(Gamma::Auto.resolve(x.view()), 0.5);
        assert_eq!(Gamma::Value(0.01).resolve(x.view()), 0.01);
        assert_eq!(Gamma::Scale.resolve(array![[3.0, 3.0]].view()), 1.0);
    }

    #[test]
    fn ties_go_to_the_earliest_grid_point() {
        // Identical rows make every point equally fit.
        let known = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let grid = vec![
            Hyperparams { gamma: Gamma::Value(0.5), nu: 0.5 },
            Hyperparams { gamma: Gamma::Value(0.25), nu: 0.5 },
        ];
        let (best, scores) = select(known.view(), &grid, 1).unwrap();
        assert_eq!(scores[0].fitness, scores[1].fitness);
        assert_eq!(best, grid[0]);
    }

    #[test]
    fn selection_is_reproducible() {
        let known = array![[0.0, 1.0], [0.5, 0.2], [1.2, -0.3], [-0.7, 0.4], [0.3, 0.9], [2.0, 1.0]];
        let first = select(known.view(), &default_grid(), 2025).unwrap();
        let second = select(known.view(), &default_grid(), 2025).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }
}
