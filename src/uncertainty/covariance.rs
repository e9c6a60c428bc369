//! # Covariance Matrix Calculations
//!
//! This module provides functions for calculating and manipulating covariance
//! matrices from Jacobian matrices in nonlinear least-squares optimization.

use ndarray::Array2;

use crate::utils::matrix_convert::{nalgebra_to_ndarray, ndarray_to_nalgebra};

/// Singular values below this fraction of the largest one mark the normal
/// matrix as rank deficient.
const RANK_TOLERANCE: f64 = 1e-13;

/// Calculate covariance matrix from Jacobian matrix.
///
/// For nonlinear least-squares problems, the covariance matrix is estimated as:
///   covar = scale * inv(J^T * J)
/// where `scale` is the reduced chi-square for relative weights and 1 for
/// absolute weights.
///
/// Returns `None` when `J^T * J` is singular (or numerically so), instead of
/// fabricating an inverse.
pub fn calculate_covariance(jacobian: &Array2<f64>, scale: f64) -> Option<Array2<f64>> {
    if jacobian.ncols() == 0 || !scale.is_finite() || jacobian.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let jtj = ndarray_to_nalgebra(&jacobian.t().dot(jacobian));

    let singular_values = jtj.clone().singular_values();
    let largest = singular_values.max();
    let smallest = singular_values.min();
    if !(largest > 0.0) || smallest <= largest * RANK_TOLERANCE {
        return None;
    }

    let inverse = jtj.try_inverse()?;
    let covar = nalgebra_to_ndarray(&inverse) * scale;
    if covar.iter().all(|v| v.is_finite()) {
        Some(covar)
    } else {
        None
    }
}

/// Calculate correlation matrix from covariance matrix.
///
/// The correlation matrix is calculated as:
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
///
/// Entries whose variances are not positive are left at zero.
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    let mut correl = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..n {
            if i == j {
                correl[[i, j]] = 1.0;
            } else {
                let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
                if denom > 0.0 {
                    correl[[i, j]] = covar[[i, j]] / denom;
                }
            }
        }
    }

    correl
}

/// Extract standard errors from the covariance matrix.
///
/// Standard errors are the square roots of the diagonal elements. A negative
/// or non-finite diagonal entry yields `None` for that parameter.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Vec<Option<f64>> {
    covar
        .diag()
        .iter()
        .map(|&v| {
            if v.is_finite() && v >= 0.0 {
                Some(v.sqrt())
            } else {
                None
            }
        })
        .collect()
}
