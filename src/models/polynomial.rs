//! Polynomial and inverse-power models.

use crate::error::Result;
use crate::estimate::linear_regression;

use super::function::ModelFunction;
use super::spec::EquationSpec;

/// `y = m·x + n`, seeded by ordinary least squares.
pub fn linear_function_with_n() -> Result<EquationSpec> {
    Ok(EquationSpec::new(
        "linear_function_with_n",
        "y = m·x + n",
        &["m", "n"],
        "y={m}x+{n}",
        ModelFunction::elementwise(2, |x, p| p[0] * x + p[1]),
    )?
    .with_estimator(|data, _| {
        let (slope, intercept) = linear_regression(&data.x, &data.y);
        vec![slope, intercept]
    }))
}

/// `y = m·x`
pub fn linear_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "linear_function",
        "y = m·x",
        &["m"],
        "y={m}x",
        ModelFunction::elementwise(1, |x, p| p[0] * x),
    )
}

/// `y = a·x² + b·x + c`
pub fn quadratic_function_complete() -> Result<EquationSpec> {
    EquationSpec::new(
        "quadratic_function_complete",
        "y = a·x² + b·x + c",
        &["a", "b", "c"],
        "y={a}x^2+{b}x+{c}",
        ModelFunction::elementwise(3, |x, p| p[0] * x * x + p[1] * x + p[2]),
    )
}

/// `y = a·x²`
pub fn quadratic_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "quadratic_function",
        "y = a·x²",
        &["a"],
        "y={a}x^2",
        ModelFunction::elementwise(1, |x, p| p[0] * x * x),
    )
}

/// `y = a·x⁴`
pub fn fourth_power() -> Result<EquationSpec> {
    EquationSpec::new(
        "fourth_power",
        "y = a·x⁴",
        &["a"],
        "y={a}x^4",
        ModelFunction::elementwise(1, |x, p| p[0] * x.powi(4)),
    )
}

/// `y = a/x`
pub fn inverse_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "inverse_function",
        "y = a/x",
        &["a"],
        "y={a}/x",
        ModelFunction::elementwise(1, |x, p| p[0] / x),
    )
}

/// `y = a/x²`
pub fn inverse_square_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "inverse_square_function",
        "y = a/x²",
        &["a"],
        "y={a}/x^2",
        ModelFunction::elementwise(1, |x, p| p[0] / (x * x)),
    )
}
