//! Exponential, hyperbolic and logarithmic models.

use crate::error::Result;
use crate::estimate::estimate_exponential;

use super::function::ModelFunction;
use super::spec::EquationSpec;

/// `y = a·exp(b·x)`, seeded by a straight-line fit of `ln|y|`.
pub fn exponential_function() -> Result<EquationSpec> {
    Ok(EquationSpec::new(
        "exponential_function",
        "y = a·exp(b·x)",
        &["a", "b"],
        "y={a} exp({b}x)",
        ModelFunction::elementwise(2, |x, p| p[0] * (p[1] * x).exp()),
    )?
    .with_estimator(|data, _| {
        let (a, b) = estimate_exponential(&data.x, &data.y);
        vec![a, b]
    }))
}

/// `y = a·sinh(b·x)`
pub fn sinh_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "sinh_function",
        "y = a·sinh(b·x)",
        &["a", "b"],
        "y={a} sinh({b}x)",
        ModelFunction::elementwise(2, |x, p| p[0] * (p[1] * x).sinh()),
    )
}

/// `y = a·cosh(b·x)`
pub fn cosh_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "cosh_function",
        "y = a·cosh(b·x)",
        &["a", "b"],
        "y={a} cosh({b}x)",
        ModelFunction::elementwise(2, |x, p| p[0] * (p[1] * x).cosh()),
    )
}

/// `y = a·ln(x)`
pub fn ln_function() -> Result<EquationSpec> {
    EquationSpec::new(
        "ln_function",
        "y = a·ln(x)",
        &["a"],
        "y={a} ln(x)",
        ModelFunction::elementwise(1, |x, p| p[0] * x.ln()),
    )
}
