//! Fit engine scenarios on built-in models.

use approx::assert_relative_eq;
use fitlab_rs::{Dataset, EquationRegistry, ErrorKind, FitConfig, FitEngine};
use ndarray::{array, Array1};

use crate::test_helpers::{noisy_line, scenario_line};

fn registry() -> EquationRegistry {
    EquationRegistry::with_builtins().unwrap()
}

#[test]
fn test_linear_scenario() {
    let registry = registry();
    let result = FitEngine::default()
        .fit(&scenario_line(), registry.lookup("linear_function_with_n").unwrap())
        .unwrap();

    let m = result.parameter("m").unwrap();
    let n = result.parameter("n").unwrap();
    assert!((m - 1.98).abs() < 0.05, "m = {}", m);
    assert!((n - 0.1).abs() < 0.1, "n = {}", n);
    assert!(result.r_squared().unwrap() > 0.99);
    assert!(result.success);

    let sigma_m = result.std_error("m").unwrap();
    assert!(sigma_m > 0.0 && sigma_m < 0.1);
    let (lo, hi) = result.confidence_intervals[0].unwrap();
    assert!(lo < m && m < hi);
}

#[test]
fn test_noisy_lines_recover_parameters() {
    let registry = registry();
    let engine = FitEngine::default();
    let spec = registry.lookup("linear_function_with_n").unwrap();

    for seed in 0..5 {
        let data = noisy_line(2.5, -1.0, 50, 0.1, seed);
        let result = engine.fit(&data, spec).unwrap();

        let sigma_m = result.std_error("m").unwrap();
        let sigma_n = result.std_error("n").unwrap();
        assert!((result.params[0] - 2.5).abs() < 5.0 * sigma_m, "seed {}", seed);
        assert!((result.params[1] + 1.0).abs() < 5.0 * sigma_n, "seed {}", seed);
        assert!(result.r_squared().unwrap() > 0.9);
        assert_relative_eq!(result.statistics.rmse, 0.1, max_relative = 0.5);
    }
}

#[test]
fn test_constant_data_reports_undefined_r_squared() {
    let registry = registry();
    let data = Dataset::new("flat", Array1::linspace(0.0, 1.0, 8), Array1::from_elem(8, -2.0));
    for id in ["linear_function_with_n", "quadratic_function_complete"] {
        let result = FitEngine::default().fit(&data, registry.lookup(id).unwrap()).unwrap();
        assert!(result.r_squared().is_none(), "{}", id);
        assert!(result.parameters_text().contains("R²=undefined"));
    }
}

#[test]
fn test_rendered_equation_round_trips() {
    let registry = registry();
    let engine = FitEngine::default();
    let x = Array1::linspace(-3.0, 3.0, 40);
    let data = Dataset::new("parabola", x.clone(), x.mapv(|v| 0.75 * v * v - 2.125 * v + 3.5));

    let spec = registry.lookup("quadratic_function_complete").unwrap();
    let result = engine.fit(&data, spec).unwrap();
    let parsed = spec
        .template
        .parse_values(&result.equation, &spec.parameter_names)
        .unwrap();

    assert_eq!(parsed.len(), result.params.len());
    for (rendered, fitted) in parsed.iter().zip(&result.params) {
        // Four significant figures.
        assert_relative_eq!(*rendered, *fitted, max_relative = 5e-4);
    }
}

#[test]
fn test_significant_figures_from_json_config() {
    let config = FitConfig::from_json_str(r#"{"significant_figures": 3}"#).unwrap();
    let engine = FitEngine::new(config).unwrap();
    let registry = registry();
    let x = array![1.0, 2.0, 3.0, 4.0];
    let data = Dataset::new("slope", x.clone(), x.mapv(|v| 1.23456 * v));

    let result = engine.fit(&data, registry.lookup("linear_function").unwrap()).unwrap();
    assert_eq!(result.equation, "y=1.23x");
}

#[test]
fn test_periodic_fit_with_phase() {
    let registry = registry();
    let x = Array1::linspace(0.0, 10.0, 300);
    let data = Dataset::new("wave", x.clone(), x.mapv(|v| 2.0 * (1.5 * v + 0.5).sin()));

    let result = FitEngine::default()
        .fit(&data, registry.lookup("sin_function_with_c").unwrap())
        .unwrap();
    assert!(result.r_squared().unwrap() > 0.999);
    assert_relative_eq!(result.params[1].abs(), 1.5, epsilon = 1e-4);
    assert_relative_eq!(result.params[0].abs(), 2.0, epsilon = 1e-4);
}

#[test]
fn test_exponential_and_gaussian_fits() {
    let registry = registry();
    let engine = FitEngine::default();

    let x = Array1::linspace(0.0, 5.0, 30);
    let data = Dataset::new("growth", x.clone(), x.mapv(|v| 1.5 * (0.4 * v).exp()));
    let result = engine.fit(&data, registry.lookup("exponential_function").unwrap()).unwrap();
    assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-5);
    assert_relative_eq!(result.params[1], 0.4, epsilon = 1e-5);

    let x = Array1::linspace(-2.0, 6.0, 120);
    let data = Dataset::new(
        "peak",
        x.clone(),
        x.mapv(|v| 4.0 * (-(v - 2.0).powi(2) / (2.0 * 0.7 * 0.7)).exp()),
    );
    let result = engine.fit(&data, registry.lookup("gaussian_function").unwrap()).unwrap();
    assert_relative_eq!(result.parameter("A").unwrap(), 4.0, epsilon = 1e-5);
    assert_relative_eq!(result.parameter("mu").unwrap(), 2.0, epsilon = 1e-5);
    assert_relative_eq!(result.parameter("sigma").unwrap(), 0.7, epsilon = 1e-5);
}

#[test]
fn test_weighted_fit_chi_squared() {
    let registry = registry();
    let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
    let data = Dataset::new("weighted", x.clone(), array![2.2, 3.9, 6.1, 8.0, 9.8])
        .with_uy(array![0.1, 0.2, 0.1, 0.2, 0.1]);

    let result = FitEngine::default()
        .fit(&data, registry.lookup("linear_function_with_n").unwrap())
        .unwrap();
    assert!(result.weighted);

    let expected: f64 = data
        .y
        .iter()
        .zip(&result.y_fitted)
        .zip(data.uy.as_ref().unwrap())
        .map(|((y, f), u)| ((y - f) / u).powi(2))
        .sum();
    assert_relative_eq!(result.statistics.chi_squared, expected, max_relative = 1e-10);
    assert_eq!(result.statistics.dof, 3);
}

#[test]
fn test_zero_uncertainty_falls_back_to_unweighted() {
    let registry = registry();
    let data = scenario_line().with_uy(array![0.1, 0.0, 0.1, 0.1, 0.1]);
    let result = FitEngine::default()
        .fit(&data, registry.lookup("linear_function_with_n").unwrap())
        .unwrap();
    assert!(!result.weighted);
}

#[test]
fn test_failures_carry_kind_and_names() {
    let registry = registry();
    let engine = FitEngine::default();

    let tiny = Dataset::from_vecs("tiny", vec![1.0, 2.0], vec![1.0, 2.0]);
    let err = engine.fit(&tiny, registry.lookup("cos_function_with_c").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fitting);
    assert!(err.to_string().contains("tiny"));
    assert!(err.to_string().contains("cos_function_with_c"));

    let broken = Dataset::from_vecs("broken", vec![1.0, 2.0, 3.0], vec![1.0, f64::NAN, 3.0]);
    let err = engine.fit(&broken, registry.lookup("linear_function").unwrap()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataValidation);

    let tight = FitEngine::new(FitConfig::default().with_max_iterations(1)).unwrap();
    let x = Array1::linspace(0.0, 2.0, 20);
    let data = Dataset::new("decay", x.clone(), x.mapv(|v| 3.0 * (-1.5 * v).exp()));
    let custom = fitlab_rs::CustomFormulaSpec::new("a*exp(b*x)", &["a", "b"]);
    let err = tight.fit_custom(&data, &custom, "custom_decay").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fitting);
}
