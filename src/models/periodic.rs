//! Sine and cosine models. Their objectives are highly multi-modal in the
//! frequency, so all of them carry estimators.

use ndarray::Array1;

use crate::config::FitConfig;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::estimate::{estimate_phase, estimate_trigonometric_parameters};

use super::function::ModelFunction;
use super::spec::EquationSpec;

fn amplitude_frequency(data: &Dataset, config: &FitConfig) -> Vec<f64> {
    let (amplitude, frequency) = estimate_trigonometric_parameters(&data.x, &data.y, config);
    vec![amplitude, frequency]
}

fn amplitude_frequency_phase(data: &Dataset, config: &FitConfig, waveform: fn(f64) -> f64) -> Vec<f64> {
    let (amplitude, frequency) = estimate_trigonometric_parameters(&data.x, &data.y, config);
    let phase = estimate_phase(
        &data.x,
        &data.y,
        amplitude,
        frequency,
        config.phase_grid_points,
        waveform,
    );
    vec![amplitude, frequency, phase]
}

fn wave(id: &str, name: &str, waveform: fn(f64) -> f64) -> Result<EquationSpec> {
    Ok(EquationSpec::new(
        id,
        &format!("y = a·{}(b·x)", name),
        &["a", "b"],
        &format!("y={{a}} {}({{b}}x)", name),
        ModelFunction::with_arity(2, move |x: &Array1<f64>, p: &[f64]| {
            Ok(x.mapv(|xi| p[0] * waveform(p[1] * xi)))
        }),
    )?
    .with_estimator(amplitude_frequency))
}

fn shifted_wave(id: &str, name: &str, waveform: fn(f64) -> f64) -> Result<EquationSpec> {
    Ok(EquationSpec::new(
        id,
        &format!("y = a·{}(b·x + c)", name),
        &["a", "b", "c"],
        &format!("y={{a}} {}({{b}}x+{{c}})", name),
        ModelFunction::with_arity(3, move |x: &Array1<f64>, p: &[f64]| {
            Ok(x.mapv(|xi| p[0] * waveform(p[1] * xi + p[2])))
        }),
    )?
    .with_estimator(move |data, config| amplitude_frequency_phase(data, config, waveform)))
}

/// `y = a·sin(b·x)`
pub fn sin_function() -> Result<EquationSpec> {
    wave("sin_function", "sin", f64::sin)
}

/// `y = a·sin(b·x + c)`
pub fn sin_function_with_c() -> Result<EquationSpec> {
    shifted_wave("sin_function_with_c", "sin", f64::sin)
}

/// `y = a·cos(b·x)`
pub fn cos_function() -> Result<EquationSpec> {
    wave("cos_function", "cos", f64::cos)
}

/// `y = a·cos(b·x + c)`
pub fn cos_function_with_c() -> Result<EquationSpec> {
    shifted_wave("cos_function_with_c", "cos", f64::cos)
}
