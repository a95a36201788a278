//! Feature preprocessing fitted on known customers: median imputation,
//! standardization and PCA truncated to an explained-variance target.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{Result, input_bail};
use super::eigen::symmetric_eigen;

/// Fraction of variance the retained principal components must exceed.
pub(crate) const EXPLAINED_VARIANCE: f64 = 0.95;

/// Fitted imputer → scaler → PCA pipeline.
#[derive(Debug, Clone)]
pub(crate) struct Preprocessor {
    kept: Vec<usize>,          // Input columns with at least one observed value in the fit rows
    medians: Array1<f64>,      // Per kept column
    means: Array1<f64>,        // Per kept column, after imputation
    scales: Array1<f64>,       // Per kept column; 1 for constant columns
    pca_mean: Array1<f64>,     // Mean of the standardized fit rows
    components: Array2<f64>,   // (kept columns, retained components)
    explained_ratio: Vec<f64>, // Variance ratio of each retained component
}

impl Preprocessor {
    /// Fit the pipeline on `x` (rows = known customers, NaN = missing).
    pub(crate) fn fit(x: ArrayView2<f64>, explained_variance: f64) -> Result<Self> {
        let (rows, cols) = x.dim();
        if rows == 0 { input_bail!("cannot fit preprocessing on zero rows") }

        // Columns that are missing everywhere carry no information and are dropped.
        let kept = (0..cols)
            .filter(|&c| x.column(c).iter().any(|v| !v.is_nan()))
            .collect::<Vec<_>>();
        if kept.is_empty() { input_bail!("no numeric feature has an observed value among known customers") }

        let medians = Array1::from_iter(kept.iter().map(|&c| median(x.column(c).iter().copied())));
        let imputed = impute(x, &kept, &medians);

        let means = imputed.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(kept.len()));
        let scales = imputed.std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let standardized = (&imputed - &means) / &scales;

        let pca_mean = standardized.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(kept.len()));
        let centered = &standardized - &pca_mean;
        let covariance = centered.t().dot(&centered) / (rows.saturating_sub(1).max(1) as f64);

        let (values, vectors) = symmetric_eigen(&covariance);
        let values = values.mapv(|v| v.max(0.0));
        let total = values.sum();
        let max_components = rows.min(kept.len()).max(1);

        let (retained, explained_ratio) = if total > 0.0 {
            let ratios = values.iter().map(|v| v / total).collect::<Vec<_>>();
            let mut cumulative = 0.0;
            let mut retained = ratios.len();
            for (i, ratio) in ratios.iter().enumerate() {
                cumulative += ratio;
                if cumulative > explained_variance { retained = i + 1; break }
            }
            let retained = retained.min(max_components);
            (retained, ratios[..retained].to_vec())
        } else {
            // Degenerate fit set (one row or identical rows): keep the leading axis.
            (1, vec![0.0])
        };

        let components = vectors.slice(ndarray::s![.., ..retained]).to_owned();

        tracing::debug!(
            rows, features = cols, kept = kept.len(), components = retained,
            "[affinity::preprocess] fitted imputer/scaler/PCA"
        );

        Ok(Self { kept, medians, means, scales, pca_mean, components, explained_ratio })
    }

    /// Project `x` (same columns as the fit input) into the retained component space.
    pub(crate) fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let imputed = impute(x, &self.kept, &self.medians);
        let standardized = (&imputed - &self.means) / &self.scales;
        (&standardized - &self.pca_mean).dot(&self.components)
    }

    #[inline] pub(crate) fn num_features(&self) -> usize { self.kept.len() }

    #[inline] pub(crate) fn num_components(&self) -> usize { self.components.ncols() }

    #[inline] pub(crate) fn explained_ratio(&self) -> &[f64] { &self.explained_ratio }
}

/// Median of the non-NaN values (mean of the two middle values for even counts).
fn median(values: impl Iterator<Item = f64>) -> f64 {
    let mut observed = values.filter(|v| !v.is_nan()).collect::<Vec<_>>();
    observed.sort_by(f64::total_cmp);
    let n = observed.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => observed[n / 2],
        _ => (observed[n / 2 - 1] + observed[n / 2]) / 2.0,
    }
}

/// Select the kept columns of `x`, replacing NaN with the column median.
fn impute(x: ArrayView2<f64>, kept: &[usize], medians: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((x.nrows(), kept.len()), |(r, k)| {
        let v = x[[r, kept[k]]];
        if v.is_nan() { medians[k] } else { v }
    })
}
