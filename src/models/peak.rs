//! Peak-shaped models.

use crate::error::Result;
use crate::estimate::estimate_gaussian;
use crate::parameters::Bounds;

use super::function::ModelFunction;
use super::spec::EquationSpec;

/// `y = A·exp(-(x - mu)² / (2·sigma²))` with `sigma >= 0`.
pub fn gaussian_function() -> Result<EquationSpec> {
    Ok(EquationSpec::new(
        "gaussian_function",
        "y = A·exp(-(x - μ)²/(2σ²))",
        &["A", "mu", "sigma"],
        "y={A} exp(-(x-{mu})^2/(2{sigma}^2))",
        ModelFunction::elementwise(3, |x, p| {
            let z = (x - p[1]) / p[2];
            p[0] * (-0.5 * z * z).exp()
        }),
    )?
    .with_bounds(vec![Bounds::unbounded(), Bounds::unbounded(), Bounds::min_only(0.0)])
    .with_estimator(|data, _| {
        let (amplitude, center, sigma) = estimate_gaussian(&data.x, &data.y);
        vec![amplitude, center, sigma]
    }))
}
