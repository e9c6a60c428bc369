//! Fit results and their text rendering.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::utils::{format_parameter, format_significant};

/// Goodness-of-fit figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    /// `1 - SS_res/SS_tot` on unweighted residuals; `None` for constant `y`.
    pub r_squared: Option<f64>,
    /// Root mean square of the unweighted residuals.
    pub rmse: f64,
    /// Weighted sum of squared residuals (unweighted when no `uy` is used).
    pub chi_squared: f64,
    /// `chi_squared / dof`; `None` when there are no degrees of freedom.
    pub reduced_chi_squared: Option<f64>,
    /// Samples minus parameters.
    pub dof: usize,
}

impl FitStatistics {
    /// Compute statistics from data, fitted values and optional weights.
    pub fn compute(
        y: &Array1<f64>,
        y_fitted: &Array1<f64>,
        weights: Option<&Array1<f64>>,
        n_params: usize,
    ) -> Self {
        let n = y.len();
        let residuals = y - y_fitted;
        let ss_res: f64 = residuals.iter().map(|r| r * r).sum();

        let mean = if n > 0 { y.sum() / n as f64 } else { 0.0 };
        let ss_tot: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
        let r_squared = if ss_tot > 0.0 {
            Some(1.0 - ss_res / ss_tot)
        } else {
            None
        };

        let chi_squared = match weights {
            Some(w) => residuals.iter().zip(w).map(|(r, w)| w * r * r).sum(),
            None => ss_res,
        };
        let dof = n.saturating_sub(n_params);

        Self {
            r_squared,
            rmse: if n > 0 { (ss_res / n as f64).sqrt() } else { 0.0 },
            chi_squared,
            reduced_chi_squared: if dof > 0 {
                Some(chi_squared / dof as f64)
            } else {
                None
            },
            dof,
        }
    }
}

/// Outcome of one successful fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub equation_id: String,
    pub dataset_name: String,
    pub parameter_names: Vec<String>,
    /// Fitted parameters in declared order.
    pub params: Vec<f64>,
    /// Standard error per parameter; `None` where the covariance is undefined.
    pub std_errors: Vec<Option<f64>>,
    pub confidence_intervals: Vec<Option<(f64, f64)>>,
    pub confidence_level: f64,
    pub covariance: Option<Array2<f64>>,
    /// Parameter correlations, defined exactly when the covariance is.
    pub correlation: Option<Array2<f64>>,
    pub y_fitted: Array1<f64>,
    /// Display template with the fitted values substituted.
    pub equation: String,
    /// Functional form, e.g. `y = m·x + n`.
    pub formula: String,
    pub statistics: FitStatistics,
    /// Weights `1/uy²` were used and treated as absolute.
    pub weighted: bool,
    pub significant_figures: usize,
    pub iterations: usize,
    pub message: String,
    pub success: bool,
}

impl FitResult {
    pub fn r_squared(&self) -> Option<f64> {
        self.statistics.r_squared
    }

    /// Value of a named parameter.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameter_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.params[i])
    }

    /// Standard error of a named parameter, if defined.
    pub fn std_error(&self, name: &str) -> Option<f64> {
        self.parameter_names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.std_errors[i])
    }

    /// Correlation between two named parameters, if the covariance is defined.
    pub fn correlation_between(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.parameter_names.iter().position(|n| n == a)?;
        let j = self.parameter_names.iter().position(|n| n == b)?;
        self.correlation.as_ref().map(|c| c[[i, j]])
    }

    /// Parameter and statistics report.
    ///
    /// One `name=value, σ(name)=sigma` line per parameter, then R², RMSE, χ²,
    /// reduced χ² and degrees of freedom, then one confidence interval line
    /// per parameter.
    pub fn parameters_text(&self) -> String {
        let sig = self.significant_figures;
        let fmt_opt = |value: Option<f64>| match value {
            Some(v) => format_significant(v, sig),
            None => "undefined".to_string(),
        };

        let mut lines = Vec::new();
        for (i, name) in self.parameter_names.iter().enumerate() {
            let (value, sigma) = format_parameter(self.params[i], self.std_errors[i]);
            lines.push(format!("{}={}, σ({})={}", name, value, name, sigma));
        }

        let stats = &self.statistics;
        lines.push(format!("R²={}", fmt_opt(stats.r_squared)));
        lines.push(format!("RMSE={}", format_significant(stats.rmse, sig)));
        lines.push(format!("χ²={}", format_significant(stats.chi_squared, sig)));
        lines.push(format!("χ²_red={}", fmt_opt(stats.reduced_chi_squared)));
        lines.push(format!("dof={}", stats.dof));

        let level = format_significant(self.confidence_level * 100.0, 3);
        for (name, interval) in self.parameter_names.iter().zip(&self.confidence_intervals) {
            match interval {
                Some((lo, hi)) => lines.push(format!(
                    "{} IC {}%: [{}, {}]",
                    name,
                    level,
                    format_significant(*lo, sig),
                    format_significant(*hi, sig)
                )),
                None => lines.push(format!("{} IC {}%: undefined", name, level)),
            }
        }

        lines.join("\n")
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.equation, self.equation_id)?;
        write!(f, "{}", self.parameters_text())
    }
}
