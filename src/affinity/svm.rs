//! One-class SVM with an RBF kernel (nu formulation), trained by SMO.
//!
//! Dual problem, in the scaling LIBSVM uses:
//!
//! ```text
//! minimize   ½ αᵀQα
//! subject to 0 ≤ αᵢ ≤ 1,  Σ αᵢ = ν·l
//! ```
//!
//! with Qᵢⱼ = exp(-γ‖xᵢ − xⱼ‖²). The decision function is Σ αᵢ K(xᵢ, x) − ρ:
//! positive inside the learned support region, negative outside.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{Result, input_bail, validate};

const TAU: f64 = 1e-12;
const TOLERANCE: f64 = 1e-3;

/// Hyperparameters of a single one-class SVM fit (`gamma` already resolved to a number).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OneClassSvm {
    pub nu: f64,
    pub gamma: f64,
}

/// A trained model: support vectors with their dual weights and offset.
#[derive(Debug, Clone)]
pub(crate) struct FittedSvm {
    support: Array2<f64>,
    alpha: Array1<f64>,
    rho: f64,
    gamma: f64,
}

impl OneClassSvm {
    /// Train on the rows of `x`.
    pub(crate) fn fit(&self, x: ArrayView2<f64>) -> Result<FittedSvm> {
        let l = x.nrows();
        if l == 0 { input_bail!("cannot fit a one-class SVM on zero rows") }
        validate!(self.nu > 0.0 && self.nu <= 1.0, "nu must lie in (0, 1] (got {})", self.nu);
        validate!(self.gamma > 0.0 && self.gamma.is_finite(), "gamma must be positive (got {})", self.gamma);

        let q = Array2::from_shape_fn((l, l), |(i, j)| rbf(x.row(i), x.row(j), self.gamma));

        // Feasible start: the first ⌊νl⌋ weights at the upper bound, the remainder on the next one.
        let mut alpha = Array1::<f64>::zeros(l);
        let budget = self.nu * l as f64;
        let full = (budget.floor() as usize).min(l);
        alpha.slice_mut(ndarray::s![..full]).fill(1.0);
        if full < l { alpha[full] = budget - full as f64 }

        let mut grad = q.dot(&alpha);
        let max_iter = (100 * l).max(100_000);
        let mut iter = 0;

        while iter < max_iter {
            let Some((i, j)) = select_working_set(&q, &alpha, &grad) else { break };
            update_pair(&q, &mut alpha, &mut grad, i, j);
            iter += 1;
        }
        if iter == max_iter {
            tracing::warn!(iter, nu = self.nu, gamma = self.gamma, "[affinity::svm] SMO reached iteration limit");
        }

        let rho = offset(&alpha, &grad);
        let support_rows = (0..l).filter(|&i| alpha[i] > 0.0).collect::<Vec<_>>();

        Ok(FittedSvm {
            support: x.select(ndarray::Axis(0), &support_rows),
            alpha: Array1::from_iter(support_rows.iter().map(|&i| alpha[i])),
            rho,
            gamma: self.gamma,
        })
    }
}

impl FittedSvm {
    /// Signed distance to the learned boundary for every row of `x`.
    pub(crate) fn decision_function(&self, x: ArrayView2<f64>) -> Array1<f64> {
        Array1::from_iter(x.rows().into_iter().map(|row| {
            self.support.rows().into_iter()
                .zip(self.alpha.iter())
                .map(|(sv, a)| a * rbf(sv, row, self.gamma))
                .sum::<f64>() - self.rho
        }))
    }

    #[inline] pub(crate) fn num_support(&self) -> usize { self.alpha.len() }
}

#[inline]
fn rbf(a: ArrayView1<f64>, b: ArrayView1<f64>, gamma: f64) -> f64 {
    let sq = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f64>();
    (-gamma * sq).exp()
}

/// Second-order working set selection (all labels +1). Returns None at optimality.
fn select_working_set(q: &Array2<f64>, alpha: &Array1<f64>, grad: &Array1<f64>) -> Option<(usize, usize)> {
    let l = alpha.len();

    let mut g_max = f64::NEG_INFINITY;
    let mut i = None;
    for t in 0..l {
        if alpha[t] < 1.0 && -grad[t] >= g_max {
            g_max = -grad[t];
            i = Some(t);
        }
    }
    let i = i?;

    let mut g_max2 = f64::NEG_INFINITY;
    let mut j = None;
    let mut obj_min = f64::INFINITY;
    for t in 0..l {
        if alpha[t] <= 0.0 { continue }
        g_max2 = g_max2.max(grad[t]);

        let diff = g_max + grad[t];
        if diff > 0.0 {
            let curvature = q[[i, i]] + q[[t, t]] - 2.0 * q[[i, t]];
            let obj = -(diff * diff) / if curvature > 0.0 { curvature } else { TAU };
            if obj <= obj_min {
                obj_min = obj;
                j = Some(t);
            }
        }
    }

    if g_max + g_max2 < TOLERANCE { return None }
    j.map(|j| (i, j))
}

/// Analytic two-variable update keeping αᵢ + αⱼ fixed and both in [0, 1].
fn update_pair(q: &Array2<f64>, alpha: &mut Array1<f64>, grad: &mut Array1<f64>, i: usize, j: usize) {
    let (old_i, old_j) = (alpha[i], alpha[j]);

    let curvature = q[[i, i]] + q[[j, j]] - 2.0 * q[[i, j]];
    let delta = (grad[i] - grad[j]) / if curvature > 0.0 { curvature } else { TAU };
    let sum = old_i + old_j;
    let (mut ai, mut aj) = (old_i - delta, old_j + delta);

    if sum > 1.0 {
        if ai > 1.0 { ai = 1.0; aj = sum - 1.0; }
    } else if aj < 0.0 {
        aj = 0.0; ai = sum;
    }
    if sum > 1.0 {
        if aj > 1.0 { aj = 1.0; ai = sum - 1.0; }
    } else if ai < 0.0 {
        ai = 0.0; aj = sum;
    }

    alpha[i] = ai;
    alpha[j] = aj;

    let (di, dj) = (ai - old_i, aj - old_j);
    for k in 0..grad.len() {
        grad[k] += q[[k, i]] * di + q[[k, j]] * dj;
    }
}

/// Offset ρ: mean gradient over free weights, else the midpoint of the feasible interval.
fn offset(alpha: &Array1<f64>, grad: &Array1<f64>) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_sum = 0.0;
    let mut free_count = 0usize;

    for (a, g) in alpha.iter().zip(grad.iter()) {
        if *a >= 1.0 {
            lower = lower.max(*g);
        } else if *a <= 0.0 {
            upper = upper.min(*g);
        } else {
            free_sum += g;
            free_count += 1;
        }
    }

    if free_count > 0 { free_sum / free_count as f64 } else { (upper + lower) / 2.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn cluster() -> Array2<f64> {
        array![
            [0.0, 0.0], [0.1, 0.0], [0.0, 0.1], [-0.1, 0.0], [0.0, -0.1],
            [0.05, 0.05], [-0.05, 0.05], [0.05, -0.05], [-0.05, -0.05], [0.0, 0.02],
        ]
    }

    #[test]
    fn dual_weights_stay_feasible() {
        let model = OneClassSvm { nu: 0.3, gamma: 1.0 }.fit(cluster().view()).unwrap();
        let total = model.alpha.sum();
        assert!((total - 0.3 * 10.0).abs() < 1e-9, "sum alpha = {total}");
        assert!(model.alpha.iter().all(|&a| a > 0.0 && a <= 1.0 + 1e-12));
    }

    #[test]
    fn inliers_score_above_far_outliers() {
        let model = OneClassSvm { nu: 0.1, gamma: 0.5 }.fit(cluster().view()).unwrap();
        let scores = model.decision_function(array![[0.0, 0.0], [5.0, 5.0], [50.0, -50.0]].view());
        assert!(scores[0] > scores[1]);
        assert!(scores[1] >= scores[2]);
        assert!(scores[2] < 0.0);
    }

    #[test]
    fn single_row_fit_scores_its_own_point_highest() {
        let x = array![[1.0, 2.0]];
        let model = OneClassSvm { nu: 0.05, gamma: 1.0 }.fit(x.view()).unwrap();
        assert_eq!(model.num_support(), 1);

        let scores = model.decision_function(array![[1.0, 2.0], [2.0, 2.0]].view());
        assert!(scores[0].abs() < 1e-12);
        assert!(scores[1] < scores[0]);
    }

    #[test]
    fn fit_is_deterministic() {
        let svm = OneClassSvm { nu: 0.05, gamma: 0.8 };
        let a = svm.fit(cluster().view()).unwrap().decision_function(cluster().view());
        let b = svm.fit(cluster().view()).unwrap().decision_function(cluster().view());
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_hyperparameters() {
        assert!(OneClassSvm { nu: 0.0, gamma: 1.0 }.fit(cluster().view()).is_err());
        assert!(OneClassSvm { nu: 0.5, gamma: -1.0 }.fit(cluster().view()).is_err());
        assert!(OneClassSvm { nu: 0.5, gamma: 1.0 }.fit(Array2::<f64>::zeros((0, 2)).view()).is_err());
    }
}
