//! # Uncertainty Calculation
//!
//! This module derives parameter uncertainties from the Jacobian of the
//! weighted residuals at the solution:
//!
//! - Covariance matrix estimation, scaled by the reduced chi-square unless the
//!   weights are absolute
//! - Standard errors that are reported as undefined rather than fabricated
//! - Student-t confidence intervals

mod confidence;
mod covariance;

pub use confidence::{confidence_intervals, normal_quantile, student_t_quantile, t_critical};
pub use covariance::{calculate_correlation, calculate_covariance, standard_errors_from_covariance};

use ndarray::Array2;

/// Structure to hold uncertainty calculation results.
#[derive(Debug, Clone)]
pub struct UncertaintyResult {
    /// Covariance matrix, `None` when it could not be estimated
    pub covariance: Option<Array2<f64>>,
    /// Standard error per parameter, `None` where undefined
    pub standard_errors: Vec<Option<f64>>,
    /// Confidence interval per parameter
    pub confidence_intervals: Vec<Option<(f64, f64)>>,
    /// Correlation matrix derived from covariance
    pub correlation: Option<Array2<f64>>,
}

/// Calculator for parameter uncertainties.
#[derive(Debug, Clone)]
pub struct UncertaintyCalculator {
    /// Degrees of freedom (n_points - n_parameters)
    pub nfree: usize,
    /// Chi-square value at minimum
    pub chisqr: f64,
    /// Weights are true measurement uncertainties
    pub absolute_weights: bool,
}

impl UncertaintyCalculator {
    /// Create a new UncertaintyCalculator
    pub fn new(ndata: usize, nvarys: usize, chisqr: f64, absolute_weights: bool) -> Self {
        Self {
            nfree: ndata.saturating_sub(nvarys),
            chisqr,
            absolute_weights,
        }
    }

    /// Factor applied to `inv(J^T J)`.
    ///
    /// One for absolute weights, the reduced chi-square otherwise. Relative
    /// weights with no degrees of freedom leave the scale undefined.
    pub fn scale(&self) -> Option<f64> {
        if self.absolute_weights {
            Some(1.0)
        } else if self.nfree == 0 {
            None
        } else {
            Some(self.chisqr / self.nfree as f64)
        }
    }

    /// Calculate the covariance matrix from the Jacobian
    pub fn calculate_covariance(&self, jacobian: &Array2<f64>) -> Option<Array2<f64>> {
        calculate_covariance(jacobian, self.scale()?)
    }

    /// Run the full analysis for the fitted `values`.
    pub fn analyze(&self, jacobian: &Array2<f64>, values: &[f64], confidence: f64) -> UncertaintyResult {
        let covariance = self.calculate_covariance(jacobian);
        let standard_errors = match &covariance {
            Some(covar) => standard_errors_from_covariance(covar),
            None => vec![None; values.len()],
        };
        let confidence_intervals =
            confidence_intervals(values, &standard_errors, confidence, self.nfree);
        let correlation = covariance.as_ref().map(calculate_correlation);

        UncertaintyResult {
            covariance,
            standard_errors,
            confidence_intervals,
            correlation,
        }
    }
}
