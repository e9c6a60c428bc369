//! Configuration options for the Levenberg-Marquardt algorithm.
//!
//! This module defines the iteration budget, convergence tolerances and damping
//! schedule used by [`LevenbergMarquardt`](super::LevenbergMarquardt).

use serde::{Deserialize, Serialize};

/// Configuration options for the Levenberg-Marquardt algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LmConfig {
    /// Maximum number of iterations (Jacobian evaluations). Default: 200
    pub max_iterations: usize,

    /// Tolerance for relative reduction of the cost. Default: 1e-10
    pub ftol: f64,

    /// Tolerance for relative change in parameter values. Default: 1e-10
    pub xtol: f64,

    /// Tolerance for the gradient infinity norm. Default: 1e-10
    pub gtol: f64,

    /// Initial value for the damping parameter. Default: 1e-3
    pub initial_lambda: f64,

    /// Factor by which to increase lambda after a rejected step. Default: 10.0
    pub lambda_up_factor: f64,

    /// Factor by which to decrease lambda after an accepted step. Default: 0.1
    pub lambda_down_factor: f64,

    /// Minimum value for lambda. Default: 1e-12
    pub min_lambda: f64,

    /// Maximum value for lambda; exceeding it ends the search. Default: 1e12
    pub max_lambda: f64,

    /// Relative step used for finite-difference Jacobians. Default: sqrt(machine epsilon)
    pub fd_epsilon: f64,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
            initial_lambda: 1e-3,
            lambda_up_factor: 10.0,
            lambda_down_factor: 0.1,
            min_lambda: 1e-12,
            max_lambda: 1e12,
            fd_epsilon: f64::EPSILON.sqrt(),
        }
    }
}

impl LmConfig {
    /// Check that every tunable is usable.
    pub fn check(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("optimizer.max_iterations must be at least 1".to_string());
        }
        for (name, value) in [
            ("ftol", self.ftol),
            ("xtol", self.xtol),
            ("gtol", self.gtol),
            ("fd_epsilon", self.fd_epsilon),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("optimizer.{} must be finite and non-negative", name));
            }
        }
        if self.fd_epsilon == 0.0 {
            return Err("optimizer.fd_epsilon must be positive".to_string());
        }
        if !(self.initial_lambda > 0.0 && self.min_lambda > 0.0)
            || self.min_lambda > self.max_lambda
        {
            return Err("optimizer damping range is invalid".to_string());
        }
        if !(self.lambda_up_factor > 1.0 && self.lambda_down_factor > 0.0 && self.lambda_down_factor < 1.0)
        {
            return Err("optimizer damping factors must satisfy 0 < down < 1 < up".to_string());
        }
        Ok(())
    }
}
