//! User formulas: only allow-listed names ever evaluate.

use approx::assert_relative_eq;
use fitlab_rs::formula::{compile, CustomFormulaSpec, MAX_FORMULA_LEN, MAX_NESTING};
use fitlab_rs::{Dataset, EquationRegistry, ErrorKind, FitEngine, FitLabError, FormulaError};
use ndarray::{array, Array1};

#[test]
fn test_hostile_expressions_are_rejected() {
    let hostile = [
        "__import__('os').system('rm -rf /')",
        "open('/etc/passwd')",
        "exec(a)",
        "eval(x)",
        "os",
        "x.real",
        "a[0]",
        "lambda: a",
        "a = 1",
        "a; b",
        "x if a else x",
        "globals()",
        "sin.__class__",
        "a * y",
        "inf * a",
        "nan",
    ];
    for expression in hostile {
        let err = compile(expression, &["a", "b"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Equation, "{}", expression);
    }
}

#[test]
fn test_undeclared_name_is_reported() {
    match compile("a*x + offset", &["a"]).unwrap_err() {
        FitLabError::Formula(FormulaError::UnknownIdentifier { name }) => assert_eq!(name, "offset"),
        other => panic!("unexpected error: {}", other),
    }
    match compile("a*system(x)", &["a"]).unwrap_err() {
        FitLabError::Formula(FormulaError::UnknownFunction { name }) => assert_eq!(name, "system"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_syntax_error_position() {
    match compile("a*x +* b", &["a", "b"]).unwrap_err() {
        FitLabError::Formula(FormulaError::Syntax { position, .. }) => assert_eq!(position, 5),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_deeply_nested_input_is_rejected() {
    let nested = format!("{}a*x{}", "(".repeat(1_000), ")".repeat(1_000));
    match CustomFormulaSpec::new(&nested, &["a"]).compile().unwrap_err() {
        FitLabError::Formula(FormulaError::TooDeep { position, limit }) => {
            assert_eq!(limit, MAX_NESTING);
            assert_eq!(position, MAX_NESTING);
        }
        other => panic!("unexpected error: {}", other),
    }

    let huge = format!("{}a*x{}", "(".repeat(20_000), ")".repeat(20_000));
    let err = CustomFormulaSpec::new(&huge, &["a"]).compile().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Equation);
    assert!(matches!(err, FitLabError::Formula(FormulaError::TooLong { .. })));

    let long_sum = vec!["a*x"; MAX_FORMULA_LEN].join("+");
    assert!(compile(&long_sum, &["a"]).is_err());

    let nested_ok = format!("{}a*x{}", "(".repeat(32), ")".repeat(32));
    let formula = compile(&nested_ok, &["a"]).unwrap();
    assert_relative_eq!(formula.eval(&array![2.0], &[3.0]).unwrap()[0], 6.0);
}

#[test]
fn test_parameter_declarations_are_validated() {
    let cases: [&[&str]; 5] = [&["x"], &["a", "a"], &["sin"], &["2a"], &[]];
    for names in cases {
        let err = compile("1", names).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Equation, "{:?}", names);
    }
}

#[test]
fn test_domain_errors_stay_per_sample() {
    let formula = compile("a*ln(x) + b/x", &["a", "b"]).unwrap();
    let y = formula.eval(&array![-1.0, 0.0, 1.0], &[1.0, 1.0]).unwrap();
    assert!(y[0].is_nan());
    assert!(!y[1].is_finite());
    assert_relative_eq!(y[2], 1.0);
}

#[test]
fn test_precedence() {
    let formula = compile("-a^2 + b*x^2^0.5", &["a", "b"]).unwrap();
    let y = formula.eval(&array![2.0], &[3.0, 1.0]).unwrap();
    // -(3²) + 1·2^(2^0.5)
    assert_relative_eq!(y[0], -9.0 + 2f64.powf(2f64.sqrt()), epsilon = 1e-12);

    let formula = compile("a - x - 1", &["a"]).unwrap();
    assert_relative_eq!(formula.eval(&array![2.0], &[10.0]).unwrap()[0], 7.0);
}

#[test]
fn test_custom_formula_fits_like_a_builtin() {
    let x = Array1::linspace(0.0, 4.0, 25);
    let data = Dataset::new("custom", x.clone(), x.mapv(|v| 1.5 * (0.7 * v).cos() + 0.25));
    let custom = CustomFormulaSpec::new("a*cos(b*x) + c", &["a", "b", "c"]);

    let mut engine_guess = custom.clone().into_equation_spec("custom_cos").unwrap();
    engine_guess = engine_guess.with_estimator(|_, _| vec![1.0, 0.6, 0.0]);
    let mut registry = EquationRegistry::new();
    registry.register(engine_guess).unwrap();

    let result = FitEngine::default()
        .fit(&data, registry.lookup("custom_cos").unwrap())
        .unwrap();
    assert_relative_eq!(result.params[0], 1.5, epsilon = 1e-5);
    assert_relative_eq!(result.params[1], 0.7, epsilon = 1e-5);
    assert_relative_eq!(result.params[2], 0.25, epsilon = 1e-5);
    assert!(result.equation.starts_with("y=1.5*cos(0.7*x)+0.25"));
}

#[test]
fn test_custom_formula_with_singular_sample_fails_cleanly() {
    let data = Dataset::from_vecs("log", vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 1.7, 2.1]);
    let custom = CustomFormulaSpec::new("a*ln(x) + b", &["a", "b"]);
    let err = FitEngine::default().fit_custom(&data, &custom, "custom_ln").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fitting);
    assert!(err.to_string().contains("custom_ln"));
}

#[test]
fn test_spec_serializes() {
    let custom = CustomFormulaSpec::new("a*x", &["a"]);
    let json = serde_json::to_string(&custom).unwrap();
    let back: CustomFormulaSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, custom);
}
