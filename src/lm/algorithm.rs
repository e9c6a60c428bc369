//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core damped Gauss-Newton iteration used by the
//! fit engine. The damping term is scaled by the diagonal of `J^T J`
//! (Marquardt scaling) so that parameters of very different magnitudes are
//! treated evenly.

use log::debug;
use nalgebra::{DMatrix, DVector};
use ndarray::Array1;
use std::fmt;

use crate::error::{FitLabError, Result};
use crate::problem::Problem;
use crate::utils::matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

use super::config::LmConfig;

/// Lower limit for the diagonal scaling entries.
const DIAG_FLOOR: f64 = 1e-12;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new optimizer with a custom configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// A trial step is accepted only when it strictly lowers the cost; a trial
    /// point with a non-finite cost counts as a rejection. The search stops on
    /// a zero cost, a small gradient, a small relative cost reduction, a small
    /// relative step, or when the damping saturates at `max_lambda`.
    ///
    /// # Errors
    ///
    /// * `Fitting` when the cost at `initial_params` is not finite or the
    ///   iteration budget runs out before convergence.
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitLabError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;
        if !cost.is_finite() {
            return Err(FitLabError::Fitting(
                "residuals are not finite at the initial parameters".to_string(),
            ));
        }

        let mut iterations = 0;

        let message = loop {
            if cost == 0.0 {
                break "Exact fit: cost is zero".to_string();
            }
            if iterations >= self.config.max_iterations {
                return Err(FitLabError::Fitting(format!(
                    "optimizer did not converge within {} iterations (cost = {:.6e})",
                    self.config.max_iterations, cost
                )));
            }
            iterations += 1;

            let jacobian = ndarray_to_nalgebra(&problem.jacobian(&params)?);
            func_evals += n_params;
            let r = ndarray_vec_to_nalgebra(&residuals);

            let jtj = jacobian.transpose() * &jacobian;
            let g = jacobian.transpose() * &r;

            let gradient_norm = g.amax();
            if gradient_norm <= self.config.gtol {
                break format!(
                    "Gradient convergence: |g| = {:.2e} <= {:.2e}",
                    gradient_norm, self.config.gtol
                );
            }

            debug!(
                "LM iteration {}: cost = {:.6e}, |g| = {:.2e}, lambda = {:.2e}",
                iterations, cost, gradient_norm, lambda
            );

            // Raise the damping until a step lowers the cost.
            let accepted = loop {
                if let Some(step) = solve_damped(&jtj, &g, lambda) {
                    let step = nalgebra_vec_to_ndarray(&step);
                    let trial = &params + &step;
                    let trial_residuals = problem.eval(&trial)?;
                    func_evals += 1;
                    let trial_cost = sum_of_squares(&trial_residuals);

                    if trial_cost.is_finite() && trial_cost < cost {
                        let cost_change = (cost - trial_cost) / cost;
                        let param_norm = params.iter().map(|p| p * p).sum::<f64>().sqrt();
                        let step_norm = step.iter().map(|s| s * s).sum::<f64>().sqrt();
                        let param_change = step_norm / (param_norm + self.config.xtol);

                        params = trial;
                        residuals = trial_residuals;
                        cost = trial_cost;
                        lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                        break Some((cost_change, param_change));
                    }
                }

                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break None;
                }
            };

            match accepted {
                None => break "No further reduction possible: damping saturated".to_string(),
                Some((cost_change, _)) if cost_change <= self.config.ftol => {
                    break format!(
                        "Cost convergence: |df|/f = {:.2e} <= {:.2e}",
                        cost_change, self.config.ftol
                    );
                }
                Some((_, param_change)) if param_change <= self.config.xtol => {
                    break format!(
                        "Parameter convergence: |dx|/|x| = {:.2e} <= {:.2e}",
                        param_change, self.config.xtol
                    );
                }
                Some(_) => {}
            }
        };

        debug!("LM finished after {} iterations: {}", iterations, message);

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: true,
            message,
        })
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}

/// Solve `(J^T J + λ D) δ = -J^T r` with `D = diag(J^T J)`.
///
/// Cholesky first, LU when the damped matrix is not numerically positive
/// definite. Returns `None` if neither yields a finite step.
fn solve_damped(jtj: &DMatrix<f64>, g: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut a = jtj.clone();
    for i in 0..a.nrows() {
        a[(i, i)] += lambda * jtj[(i, i)].max(DIAG_FLOOR);
    }
    let rhs = -g;

    let step = match a.clone().cholesky() {
        Some(chol) => Some(chol.solve(&rhs)),
        None => a.lu().solve(&rhs),
    }?;

    if step.iter().all(|v| v.is_finite()) {
        Some(step)
    } else {
        None
    }
}
