//! Trajectory error and control cost.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array, Array3, ArrayView2, Axis, Dimension, Zip};

use crate::error::{SimError, SimResult};

/// Mean of squared elementwise differences, divided by `population`.
///
/// # Errors
///
/// Returns an error if the shapes differ or the arrays are empty.
pub fn mean_squared_error<D: Dimension>(
    x: &Array<f64, D>,
    y: &Array<f64, D>,
    population: usize,
) -> SimResult<f64> {
    if x.shape() != y.shape() {
        return Err(SimError::shape(x.shape(), y.shape()));
    }
    if x.is_empty() {
        return Err(SimError::config("cannot compute error of empty arrays"));
    }
    let sum = Zip::from(x)
        .and(y)
        .fold(0.0, |acc, &a, &b| acc + (a - b) * (a - b));
    Ok(sum / x.len() as f64 / population as f64)
}

/// Matrix 2-norm (largest singular value) of `a`.
///
/// Square root of the largest eigenvalue of the smaller Gram matrix,
/// `aᵀa` or `aaᵀ`, from a full symmetric eigen-decomposition.
#[must_use]
pub fn spectral_norm(a: ArrayView2<'_, f64>) -> f64 {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return 0.0;
    }
    let gram = if rows < cols { a.dot(&a.t()) } else { a.t().dot(&a) };
    let k = gram.nrows();
    let matrix = DMatrix::from_fn(k, k, |i, j| gram[[i, j]]);

    let eigen = SymmetricEigen::new(matrix);
    let largest = eigen.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    largest.sqrt()
}

/// One spectral norm per sample of a `(samples, timesteps, nodes)` control tensor.
#[must_use]
pub fn control_cost(control: &Array3<f64>) -> Vec<f64> {
    control
        .axis_iter(Axis(0))
        .map(spectral_norm)
        .collect()
}
