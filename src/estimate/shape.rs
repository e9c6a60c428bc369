//! Initial guesses for exponential and peak-shaped models.

use log::debug;
use ndarray::Array1;

use super::linear_regression;

/// Guess `(a, b)` for `y = a·exp(b·x)` from a straight-line fit of `ln|y|`.
///
/// Only samples sharing the sign of the majority are used. With fewer than
/// two usable samples the guess is `(1, 0)`.
pub fn estimate_exponential(x: &Array1<f64>, y: &Array1<f64>) -> (f64, f64) {
    let positive = y.iter().filter(|&&v| v > 0.0).count();
    let negative = y.iter().filter(|&&v| v < 0.0).count();
    let sign = if negative > positive { -1.0 } else { 1.0 };

    let (xs, logs): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && sign * **yi > 0.0)
        .map(|(&xi, &yi)| (xi, (sign * yi).ln()))
        .unzip();

    if xs.len() < 2 {
        debug!("exponential guess: too few samples of one sign, using defaults");
        return (1.0, 0.0);
    }

    let (slope, intercept) = linear_regression(&Array1::from_vec(xs), &Array1::from_vec(logs));
    let amplitude = sign * intercept.exp();
    if amplitude.is_finite() && slope.is_finite() {
        (amplitude, slope)
    } else {
        (1.0, 0.0)
    }
}

/// Guess `(amplitude, center, sigma)` for a Gaussian peak.
///
/// The center is the position of the largest sample and the width comes from
/// the half-maximum crossings on either side (FWHM = 2.3548·σ). When no
/// crossing is found the width falls back to a sixth of the x range.
pub fn estimate_gaussian(x: &Array1<f64>, y: &Array1<f64>) -> (f64, f64, f64) {
    let samples: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    let Some((max_idx, &(center, max_y))) = samples
        .iter()
        .enumerate()
        .filter(|(_, (_, v))| v.is_finite())
        .max_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b))
    else {
        return (1.0, 0.0, 1.0);
    };

    let half_height = max_y / 2.0;

    let mut left_idx = max_idx;
    while left_idx > 0 && samples[left_idx].1 > half_height {
        left_idx -= 1;
    }
    let mut right_idx = max_idx;
    while right_idx + 1 < samples.len() && samples[right_idx].1 > half_height {
        right_idx += 1;
    }

    let fwhm = (samples[right_idx].0 - samples[left_idx].0).abs();
    let x_min = samples.iter().map(|s| s.0).fold(f64::INFINITY, f64::min);
    let x_max = samples.iter().map(|s| s.0).fold(f64::NEG_INFINITY, f64::max);
    let sigma = if fwhm > 0.0 && fwhm.is_finite() {
        fwhm / 2.354_820_045
    } else {
        (x_max - x_min) / 6.0
    };
    let sigma = if sigma > 0.0 && sigma.is_finite() { sigma } else { 1.0 };

    (max_y, center, sigma)
}
