//! Heuristic initial guesses for models whose least-squares objective is
//! multi-modal or badly scaled.
//!
//! Estimators never fail on a valid non-empty dataset. When the signal is
//! ambiguous they degrade to documented defaults and log the fallback.

pub mod periodic;
pub mod shape;

pub use periodic::{
    detrend, estimate_amplitude, estimate_frequency, estimate_phase,
    estimate_trigonometric_parameters,
};
pub use shape::{estimate_exponential, estimate_gaussian};

use ndarray::Array1;

/// Ordinary least-squares line through `(x, y)`, returned as `(slope, intercept)`.
///
/// A degenerate `x` (all values equal) gives a zero slope through the mean.
pub fn linear_regression(x: &Array1<f64>, y: &Array1<f64>) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n == 0 {
        return (0.0, 0.0);
    }
    let x_mean = x.iter().take(n).sum::<f64>() / n as f64;
    let y_mean = y.iter().take(n).sum::<f64>() / n as f64;

    let (sxy, sxx) = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0), |(sxy, sxx), (&xi, &yi)| {
            let dx = xi - x_mean;
            (sxy + dx * (yi - y_mean), sxx + dx * dx)
        });

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, y_mean - slope * x_mean)
}
