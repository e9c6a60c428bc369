//! Initial-guess estimators on synthetic signals.

use std::f64::consts::PI;

use approx::assert_relative_eq;
use fitlab_rs::estimate::{
    estimate_amplitude, estimate_exponential, estimate_frequency, estimate_gaussian, estimate_phase,
    estimate_trigonometric_parameters,
};
use fitlab_rs::{Dataset, EquationRegistry, FitConfig};
use ndarray::Array1;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

#[test]
fn test_sine_scenario() {
    let x = Array1::linspace(0.0, 4.0 * PI, 100);
    let y = x.mapv(|v| 3.0 * v.sin());

    let (amplitude, frequency) = estimate_trigonometric_parameters(&x, &y, &FitConfig::default());
    assert_relative_eq!(amplitude, 3.0, max_relative = 0.1);
    assert_relative_eq!(frequency, 1.0, max_relative = 0.1);
}

#[test]
fn test_noisy_cosine_with_offset() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let noise = Normal::new(0.0, 0.05).unwrap();
    let x = Array1::linspace(0.0, 20.0, 500);
    let y = x.mapv(|v: f64| 2.0 + 1.5 * (0.8 * v).cos() + noise.sample(&mut rng));

    let frequency = estimate_frequency(&x, &y, 0.5).unwrap();
    assert_relative_eq!(frequency, 0.8, max_relative = 0.1);
    assert_relative_eq!(estimate_amplitude(&y), 1.5, max_relative = 0.15);
}

#[test]
fn test_unsorted_samples() {
    let x = Array1::linspace(0.0, 6.0 * PI, 240);
    let mut order: Vec<usize> = (0..x.len()).collect();
    order.reverse();
    let shuffled = Array1::from_iter(order.iter().map(|&i| x[i]));
    let y = shuffled.mapv(|v| (2.0 * v).sin());

    let frequency = estimate_frequency(&shuffled, &y, 0.5).unwrap();
    assert_relative_eq!(frequency, 2.0, max_relative = 0.1);
}

#[test]
fn test_degenerate_signals_fall_back() {
    let config = FitConfig::default();
    let x = Array1::linspace(0.0, 1.0, 3);

    let (amplitude, frequency) = estimate_trigonometric_parameters(&x, &Array1::from_elem(3, 4.0), &config);
    assert_eq!(amplitude, f64::EPSILON);
    assert_eq!(frequency, config.default_frequency);

    let single = Array1::from_elem(1, 0.0);
    assert!(estimate_frequency(&single, &single, 0.5).is_none());
}

#[test]
fn test_phase_grid_resolution_is_configurable() {
    let x = Array1::linspace(0.0, 4.0 * PI, 200);
    let y = x.mapv(|v| (v - 2.0).cos());

    let coarse = estimate_phase(&x, &y, 1.0, 1.0, 4, f64::cos);
    let fine = estimate_phase(&x, &y, 1.0, 1.0, 360, f64::cos);
    assert!((fine + 2.0).abs() <= PI / 360.0 + 1e-12);
    assert!((coarse + 2.0).abs() > (fine + 2.0).abs());
}

#[test]
fn test_shape_estimators() {
    let x = Array1::linspace(0.0, 3.0, 25);
    let (a, b) = estimate_exponential(&x, &x.mapv(|v| -2.0 * (0.5 * v).exp()));
    assert_relative_eq!(a, -2.0, epsilon = 1e-9);
    assert_relative_eq!(b, 0.5, epsilon = 1e-9);

    let x = Array1::linspace(-5.0, 5.0, 201);
    let (amplitude, center, sigma) = estimate_gaussian(&x, &x.mapv(|v| 3.0 * (-(v - 1.0).powi(2) / 2.0).exp()));
    assert_relative_eq!(amplitude, 3.0, max_relative = 0.01);
    assert_relative_eq!(center, 1.0, epsilon = 0.06);
    assert_relative_eq!(sigma, 1.0, max_relative = 0.05);
}

#[test]
fn test_registry_guesses_have_parameter_count() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let config = FitConfig::default();
    let x = Array1::linspace(0.5, 10.0, 40);
    let data = Dataset::new("mixed", x.clone(), x.mapv(|v| v.sin() + 0.1 * v));

    for spec in registry.list_all() {
        let guess = spec.initial_guess(&data, &config);
        assert_eq!(guess.len(), spec.parameter_count(), "{}", spec.id);
        assert!(guess.iter().all(|g| g.is_finite()), "{}", spec.id);
    }
}
