//! Finite difference methods for numerical differentiation.
//!
//! This module provides the Jacobian approximation used by the optimizer for
//! models without analytical derivatives.

use crate::error::{FitLabError, Result};
use crate::problem::Problem;
use ndarray::{Array1, Array2};

/// Default step size for finite differences.
const DEFAULT_EPSILON: f64 = 1.4901161193847656e-8;

/// Compute the Jacobian matrix using forward finite differences.
///
/// The Jacobian is the matrix of partial derivatives of the residuals with
/// respect to the parameters: J[i,j] = ∂residual[i]/∂param[j].
///
/// Entries that come out non-finite are retried with a backward difference
/// and zeroed if that fails too, so a single undefined sample cannot poison
/// the normal equations.
///
/// # Arguments
///
/// * `problem` - The problem to evaluate
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `epsilon` - The relative step size for finite differences (optional)
pub fn jacobian(
    problem: &dyn Problem,
    params: &Array1<f64>,
    epsilon: Option<f64>,
) -> Result<Array2<f64>> {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n_params = params.len();
    let n_residuals = problem.residual_count();

    let residuals = problem.eval(params)?;
    if residuals.len() != n_residuals {
        return Err(FitLabError::DimensionMismatch(format!(
            "Expected {} residuals, got {}",
            n_residuals,
            residuals.len()
        )));
    }

    let mut jac = Array2::zeros((n_residuals, n_params));

    for j in 0..n_params {
        // Adapt epsilon to parameter scale
        let eps_j = eps * params[j].abs().max(1.0);

        let mut forward = params.clone();
        forward[j] += eps_j;
        let residuals_forward = problem.eval(&forward)?;

        let mut backward: Option<Array1<f64>> = None;
        for i in 0..n_residuals {
            let mut d = (residuals_forward[i] - residuals[i]) / eps_j;
            if !d.is_finite() {
                if backward.is_none() {
                    let mut params_backward = params.clone();
                    params_backward[j] -= eps_j;
                    backward = Some(problem.eval(&params_backward)?);
                }
                d = backward
                    .as_ref()
                    .map(|b| (residuals[i] - b[i]) / eps_j)
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
            }
            jac[[i, j]] = d;
        }
    }

    Ok(jac)
}
