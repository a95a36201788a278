//! Symmetric eigendecomposition by cyclic Jacobi rotations.
//!
//! Covariance matrices here are small (features × features), so the O(p³)
//! sweep is cheap and keeps the crate free of a LAPACK dependency.

use ndarray::{Array1, Array2};

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_TOLERANCE: f64 = 1e-14;

/// Eigenvalues (descending) and matching unit eigenvectors (as columns) of a symmetric matrix.
///
/// Each eigenvector's sign is fixed so that its largest-magnitude entry is positive.
pub(crate) fn symmetric_eigen(matrix: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols(), "matrix must be square");

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    for _ in 0..MAX_SWEEPS {
        let off = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[[p, q]] * a[[p, q]])
            .sum::<f64>();
        let scale = a.diag().iter().map(|d| d * d).sum::<f64>().max(1.0);
        if off <= OFF_DIAGONAL_TOLERANCE * scale { break }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[[p, q]].abs() < f64::MIN_POSITIVE { continue }
                rotate(&mut a, &mut v, p, q);
            }
        }
    }

    // Sort by eigenvalue, descending; stable so equal eigenvalues keep axis order.
    let mut order = (0..n).collect::<Vec<_>>();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let values = Array1::from_iter(order.iter().map(|&i| a[[i, i]]));
    let mut vectors = Array2::<f64>::zeros((n, n));
    for (col, &i) in order.iter().enumerate() {
        let mut column = v.column(i).to_owned();
        let pivot = column.iter().copied()
            .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
        if pivot < 0.0 { column.mapv_inplace(|x| -x) }
        vectors.column_mut(col).assign(&column);
    }

    (values, vectors)
}

/// Apply one Jacobi rotation zeroing a[p][q], accumulating it into v.
fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize) {
    let n = a.nrows();
    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * a[[p, q]]);
    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
    let t = if theta == 0.0 { 1.0 } else { t };
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;

    for k in 0..n {
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        a[[k, p]] = c * akp - s * akq;
        a[[k, q]] = s * akp + c * akq;
    }
    for k in 0..n {
        let apk = a[[p, k]];
        let aqk = a[[q, k]];
        a[[p, k]] = c * apk - s * aqk;
        a[[q, k]] = s * apk + c * aqk;
    }
    for k in 0..n {
        let vkp = v[[k, p]];
        let vkq = v[[k, q]];
        v[[k, p]] = c * vkp - s * vkq;
        v[[k, q]] = s * vkp + c * vkq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn diagonal_matrix_sorts_descending() {
        let (values, vectors) = symmetric_eigen(&array![[1.0, 0.0], [0.0, 3.0]]);
        assert_eq!(values.to_vec(), vec![3.0, 1.0]);
        assert_eq!(vectors, array![[0.0, 1.0], [1.0, 0.0]]);
    }

    #[test]
    fn reconstructs_symmetric_matrix() {
        let m = array![[4.0, 1.0, 2.0], [1.0, 3.0, 0.5], [2.0, 0.5, 5.0]];
        let (values, vectors) = symmetric_eigen(&m);

        let rebuilt = vectors.dot(&Array2::from_diag(&values)).dot(&vectors.t());
        for (x, y) in rebuilt.iter().zip(m.iter()) {
            assert!((x - y).abs() < 1e-9, "{x} vs {y}");
        }
        assert!(values[0] >= values[1] && values[1] >= values[2]);
    }

    #[test]
    fn two_by_two_known_eigenpairs() {
        let (values, vectors) = symmetric_eigen(&array![[2.0, 1.0], [1.0, 2.0]]);
        assert!((values[0] - 3.0).abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((vectors[[0, 0]] - h).abs() < 1e-12 && (vectors[[1, 0]] - h).abs() < 1e-12);
    }
}
