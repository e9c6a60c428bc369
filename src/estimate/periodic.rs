//! Initial guesses for periodic models.
//!
//! Amplitude comes from the peak-to-peak range, angular frequency from the
//! median spacing of peaks in the detrended signal, and phase from a coarse
//! grid search with amplitude and frequency held fixed.

use std::f64::consts::PI;

use log::{debug, warn};
use ndarray::Array1;

use super::linear_regression;
use crate::config::FitConfig;

const FLAT_TOLERANCE: f64 = 1e-9;

/// Half the peak-to-peak range of `y`.
///
/// A constant (or empty) signal yields `f64::EPSILON` so callers always get a
/// usable positive amplitude.
pub fn estimate_amplitude(y: &Array1<f64>) -> f64 {
    let (min, max) = y
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let amplitude = (max - min) / 2.0;
    if amplitude.is_finite() && amplitude > 0.0 {
        amplitude
    } else {
        f64::EPSILON
    }
}

/// Remove the least-squares straight line from `y`.
pub fn detrend(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let (slope, intercept) = linear_regression(x, y);
    y - &x.mapv(|xi| slope * xi + intercept)
}

/// Angular frequency of the dominant oscillation, or `None` when fewer than
/// two peaks are found.
///
/// The signal is detrended and split into positive lobes. A lobe counts as a
/// peak when its maximum reaches `peak_sensitivity` times the largest absolute
/// excursion. The period is the median spacing between peak positions.
pub fn estimate_frequency(x: &Array1<f64>, y: &Array1<f64>, peak_sensitivity: f64) -> Option<f64> {
    if x.len() < 3 || x.len() != y.len() {
        return None;
    }

    let mut order: Vec<usize> = (0..x.len()).collect();
    order.sort_by(|&a, &b| x[a].total_cmp(&x[b]));
    let xs = Array1::from_iter(order.iter().map(|&i| x[i]));
    let ys = Array1::from_iter(order.iter().map(|&i| y[i]));

    let residual = detrend(&xs, &ys);
    let largest = residual.iter().fold(0.0f64, |m, r| m.max(r.abs()));
    let scale = ys.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    // Residuals at rounding level carry no oscillation.
    if !(largest.is_finite() && largest > scale * FLAT_TOLERANCE) || largest == 0.0 {
        return None;
    }
    let threshold = peak_sensitivity * largest;

    let mut peaks = Vec::new();
    let mut lobe: Option<(usize, f64)> = None;
    for (i, &r) in residual.iter().enumerate() {
        if r > 0.0 {
            lobe = match lobe {
                Some((_, best)) if best >= r => lobe,
                _ => Some((i, r)),
            };
        } else if let Some((peak, height)) = lobe.take() {
            if height >= threshold {
                peaks.push(xs[peak]);
            }
        }
    }
    if let Some((peak, height)) = lobe {
        if height >= threshold {
            peaks.push(xs[peak]);
        }
    }

    if peaks.len() < 2 {
        debug!("periodicity not detected: {} peak(s) above threshold", peaks.len());
        return None;
    }

    let mut spacings: Vec<f64> = peaks.windows(2).map(|w| w[1] - w[0]).collect();
    spacings.sort_by(f64::total_cmp);
    let mid = spacings.len() / 2;
    let period = if spacings.len() % 2 == 0 {
        (spacings[mid - 1] + spacings[mid]) / 2.0
    } else {
        spacings[mid]
    };

    if period > 0.0 && period.is_finite() {
        debug!("detected {} peaks, median period {:.6}", peaks.len(), period);
        Some(2.0 * PI / period)
    } else {
        None
    }
}

/// Amplitude and angular frequency for a periodic model.
///
/// Falls back to `config.default_frequency` when no periodicity is detected.
pub fn estimate_trigonometric_parameters(
    x: &Array1<f64>,
    y: &Array1<f64>,
    config: &FitConfig,
) -> (f64, f64) {
    let amplitude = estimate_amplitude(y);
    let frequency = estimate_frequency(x, y, config.peak_sensitivity).unwrap_or_else(|| {
        warn!(
            "no periodicity detected, using default frequency {}",
            config.default_frequency
        );
        config.default_frequency
    });
    (amplitude, frequency)
}

/// Phase offset minimizing `Σ (y - amplitude·waveform(frequency·x + φ))²`
/// over `grid_points` candidates evenly spaced in `[-π, π)`.
///
/// Returns 0 when the amplitude is negligible, since every phase then fits
/// equally well.
pub fn estimate_phase(
    x: &Array1<f64>,
    y: &Array1<f64>,
    amplitude: f64,
    frequency: f64,
    grid_points: usize,
    waveform: fn(f64) -> f64,
) -> f64 {
    if !(amplitude.is_finite() && amplitude > f64::EPSILON) || !frequency.is_finite() || grid_points == 0 {
        return 0.0;
    }

    let mut best = (0.0, f64::INFINITY);
    for k in 0..grid_points {
        let phase = -PI + 2.0 * PI * k as f64 / grid_points as f64;
        let sse: f64 = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| (yi - amplitude * waveform(frequency * xi + phase)).powi(2))
            .sum();
        if sse < best.1 {
            best = (phase, sse);
        }
    }
    best.0
}
